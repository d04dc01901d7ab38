mod comment;
mod comment_id;

pub use comment::*;
pub use comment_id::*;
