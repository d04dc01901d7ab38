pub mod api;
pub mod cache;
pub mod reconciler;
pub mod storage;
pub mod view;

pub use api::{ApiClient, ApiError, CommentsApi};
pub use cache::{AdminToggle, ClientCache};
pub use reconciler::{
    CreateOutcome, DeleteOutcome, EditOutcome, FailureKind, LoadOutcome, ReconcileError,
    Reconciler,
};
pub use storage::LocalStorage;
