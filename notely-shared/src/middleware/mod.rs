mod auth_extractor;
mod extract;
mod metrics_layer;
mod tracing_layer;

pub use extract::*;
pub use metrics_layer::*;
pub use tracing_layer::*;
