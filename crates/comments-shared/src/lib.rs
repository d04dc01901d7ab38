pub mod api;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::ValidationError;

/// Header carrying the admin credential on mutating requests.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
