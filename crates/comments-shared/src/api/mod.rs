mod comments;

pub use comments::*;
