pub mod clients;
pub mod errors;
pub mod middleware;
pub mod session;
pub mod types;

pub use errors::{AppError, AppResult, ErrorCode};
pub use session::{SessionIssuer, SessionState};
pub use types::*;
