pub mod adapter;
pub mod convert;
pub mod error;
pub mod handler;
pub mod http;
pub mod payload;
pub mod signature;

pub use adapter::ControllerAdapter;
pub use error::ApiError;
pub use handler::EventHandler;
pub use http::WebhookApi;
