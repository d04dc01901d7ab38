mod guard;
mod middleware;

pub use guard::{Access, AccessGuard};
pub use middleware::require_admin;
