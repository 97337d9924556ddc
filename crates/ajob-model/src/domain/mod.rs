mod envvar;
pub use envvar::EnvVar;

mod env;
pub use env::Env;

mod flag;
pub use flag::Flag;

mod labels;
pub use labels::JobLabels;

mod constants;
pub use constants::*;

/// Manifest keys this model does not interpret.
///
/// Kept verbatim so that a manifest survives a parse/serialize cycle
/// with every platform field (resources, service account, timeouts) intact.
pub type Extra = std::collections::BTreeMap<String, serde_json::Value>;
