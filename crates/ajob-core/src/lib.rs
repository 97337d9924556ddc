pub mod controller;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod source;
pub mod store;
pub mod target;
pub mod transform;

mod guard;

pub mod prelude {
    pub use crate::controller::{Controller, ControllerConfig, DispatchOutcome};
    pub use crate::dispatch::{Dispatched, Dispatcher, ReadinessPolicy, Reconciled};
    pub use crate::error::{CoreError, Stage};
    pub use crate::gate::{AdmittedEvent, Rejection, RejectionKind, SecurityGate};
    pub use crate::metrics::{DispatchMetrics, MetricsHandle, OutcomeKind};
    pub use crate::source::{FetchError, ManifestFetcher};
    pub use crate::store::{JobStore, JobStoreError};
}
