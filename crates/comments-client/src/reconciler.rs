//! Merges server comments with the local cache and drives optimistic writes.
//!
//! Every operation changes the rendered view first, talks to the server, and
//! then either promotes the provisional state to the server's answer or
//! demotes it to a local-only entry. Decisions that need the user (whether to
//! drop a comment the server could not delete, whether a token is missing) are
//! returned as values; nothing in here prompts.

use comments_shared::{
    now_millis,
    validation::{validate_new_comment, validate_text},
    Comment, CommentId, LocalComment, ValidationError,
};

use crate::api::{ApiError, CommentsApi};
use crate::cache::ClientCache;
use crate::view::ViewEntry;

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No comment with id {0}")]
    UnknownComment(CommentId),

    #[error("Local storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Why a server round-trip did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Forbidden,
    NotFound,
    Unreachable,
    Rejected(String),
}

impl From<&ApiError> for FailureKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Forbidden => FailureKind::Forbidden,
            ApiError::NotFound => FailureKind::NotFound,
            ApiError::Network(_) => FailureKind::Unreachable,
            other => FailureKind::Rejected(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Synced { server: usize, local: usize },
    /// The server could not be listed; only cached comments are shown.
    LocalOnly { local: usize, reason: FailureKind },
}

/// A comment rendered optimistically but not yet sent.
#[derive(Debug)]
pub struct Provisional {
    comment: LocalComment,
}

impl Provisional {
    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    pub fn comment(&self) -> &LocalComment {
        &self.comment
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Confirmed(Comment),
    /// Kept in the local cache; it survives restarts until synced or deleted.
    SavedLocally {
        comment: LocalComment,
        reason: FailureKind,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    UpdatedLocally(LocalComment),
    Updated(Comment),
    /// The new text stays rendered; there is no rollback.
    Failed(FailureKind),
}

/// A delete the server did not acknowledge, waiting for the user to decide
/// whether to drop the local rendering anyway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackDelete {
    pub id: CommentId,
    pub reason: FailureKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    RemovedLocally,
    Removed,
    /// The admin token was rejected; the entry is restored.
    Forbidden,
    NeedsFallbackDecision(FallbackDelete),
}

pub struct Reconciler<A> {
    api: A,
    cache: ClientCache,
    view: Vec<ViewEntry>,
}

impl<A: CommentsApi> Reconciler<A> {
    pub fn new(api: A, cache: ClientCache) -> Self {
        Self {
            api,
            cache,
            view: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    /// The merged list as currently rendered, top first.
    pub fn view(&self) -> &[ViewEntry] {
        &self.view
    }

    pub fn entry(&self, id: &CommentId) -> Option<&ViewEntry> {
        self.view.iter().find(|e| &e.id == id)
    }

    fn position(&self, id: &CommentId) -> Result<usize, ReconcileError> {
        self.view
            .iter()
            .position(|e| &e.id == id)
            .ok_or_else(|| ReconcileError::UnknownComment(id.clone()))
    }

    fn forget_local(&self, id: &CommentId) {
        if let Err(e) = self.cache.remove(id) {
            tracing::warn!(%id, "Could not clear cached comment: {:#}", e);
        }
    }

    // ============ Load ============

    /// Rebuilds the view: cached comments on top, then the server's list
    /// newest first. If the server is unreachable only cached comments show.
    /// An unreadable cache is logged and treated as empty.
    pub async fn load(&mut self) -> LoadOutcome {
        let local = self.cache.read_all().unwrap_or_else(|e| {
            tracing::warn!("Could not read local comments, ignoring them: {:#}", e);
            Vec::new()
        });
        let local_count = local.len();

        match self.api.list_comments().await {
            Ok(mut server) => {
                server.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                let server_count = server.len();

                let mut view: Vec<ViewEntry> = local.into_iter().map(ViewEntry::from).collect();
                for comment in server {
                    let id = CommentId::Confirmed(comment.id);
                    if !view.iter().any(|e| e.id == id) {
                        view.push(comment.into());
                    }
                }
                self.view = view;

                LoadOutcome::Synced {
                    server: server_count,
                    local: local_count,
                }
            }
            Err(e) => {
                tracing::warn!("Server unavailable, showing local comments only: {}", e);
                self.view = local.into_iter().map(ViewEntry::from).collect();

                LoadOutcome::LocalOnly {
                    local: local_count,
                    reason: FailureKind::from(&e),
                }
            }
        }
    }

    // ============ Create ============

    /// Phase one: validate and render the comment at the top without saving it.
    pub fn begin_create(&mut self, author: &str, text: &str) -> Result<Provisional, ReconcileError> {
        let new = validate_new_comment(author, text)?;
        let comment = LocalComment::pending(new.author, new.text, now_millis());

        self.view.insert(0, comment.clone().into());
        Ok(Provisional { comment })
    }

    /// Phase two: send the comment. On success the server's copy replaces the
    /// provisional one; on failure the provisional one is cached.
    pub async fn finish_create(
        &mut self,
        provisional: Provisional,
    ) -> Result<CreateOutcome, ReconcileError> {
        let Provisional { comment } = provisional;

        match self.api.create_comment(&comment.author, &comment.text).await {
            Ok(saved) => {
                self.view.retain(|e| e.id != comment.id);
                self.view.insert(0, saved.clone().into());
                self.forget_local(&comment.id);
                Ok(CreateOutcome::Confirmed(saved))
            }
            Err(e) => {
                tracing::warn!("Could not post comment, keeping it locally: {}", e);
                self.cache.upsert(&comment)?;
                Ok(CreateOutcome::SavedLocally {
                    comment,
                    reason: FailureKind::from(&e),
                })
            }
        }
    }

    pub async fn create(&mut self, author: &str, text: &str) -> Result<CreateOutcome, ReconcileError> {
        let provisional = self.begin_create(author, text)?;
        self.finish_create(provisional).await
    }

    /// Sends a cached comment again. On success it leaves the cache and its
    /// rendering is replaced by the server's copy.
    pub async fn retry(&mut self, id: &CommentId) -> Result<CreateOutcome, ReconcileError> {
        let comment = self
            .cache
            .get(id)?
            .ok_or_else(|| ReconcileError::UnknownComment(id.clone()))?;

        match self.api.create_comment(&comment.author, &comment.text).await {
            Ok(saved) => {
                self.cache.remove(id)?;
                self.view.retain(|e| &e.id != id);
                self.view.insert(0, saved.clone().into());
                Ok(CreateOutcome::Confirmed(saved))
            }
            Err(e) => Ok(CreateOutcome::SavedLocally {
                comment,
                reason: FailureKind::from(&e),
            }),
        }
    }

    /// Retries every cached comment, oldest first.
    pub async fn sync_pending(&mut self) -> Result<Vec<(CommentId, CreateOutcome)>, ReconcileError> {
        let pending = self.cache.read_all()?;
        let mut outcomes = Vec::with_capacity(pending.len());

        for comment in pending.into_iter().rev() {
            let outcome = self.retry(&comment.id).await?;
            outcomes.push((comment.id, outcome));
        }

        Ok(outcomes)
    }

    // ============ Edit ============

    pub async fn edit(&mut self, id: &CommentId, text: &str) -> Result<EditOutcome, ReconcileError> {
        let text = validate_text(text)?;
        let idx = self.position(id)?;

        let entry = &mut self.view[idx];
        let server_id = match id.server_id() {
            Some(server_id) if !entry.local => server_id,
            _ => {
                let mut comment = LocalComment::from(&*entry);
                comment.set_text(text, now_millis());
                self.cache.upsert(&comment)?;
                *entry = comment.clone().into();
                return Ok(EditOutcome::UpdatedLocally(comment));
            }
        };

        entry.text.clone_from(&text);

        match self.api.update_comment(server_id, &text).await {
            Ok(updated) => {
                if let Ok(idx) = self.position(id) {
                    self.view[idx] = updated.clone().into();
                }
                Ok(EditOutcome::Updated(updated))
            }
            Err(e) => {
                tracing::warn!(%id, "Could not update comment: {}", e);
                Ok(EditOutcome::Failed(FailureKind::from(&e)))
            }
        }
    }

    // ============ Delete ============

    /// Removes a comment. `confirmed` is the user's answer to "delete this
    /// comment?"; without it nothing changes.
    pub async fn delete(
        &mut self,
        id: &CommentId,
        confirmed: bool,
    ) -> Result<DeleteOutcome, ReconcileError> {
        let idx = self.position(id)?;
        if !confirmed {
            return Ok(DeleteOutcome::Cancelled);
        }

        let entry = &mut self.view[idx];
        let server_id = match id.server_id() {
            Some(server_id) if !entry.local => server_id,
            _ => {
                self.cache.remove(id)?;
                self.view.remove(idx);
                return Ok(DeleteOutcome::RemovedLocally);
            }
        };

        entry.dimmed = true;

        match self.api.delete_comment(server_id).await {
            Ok(()) => {
                self.view.retain(|e| &e.id != id);
                self.forget_local(id);
                Ok(DeleteOutcome::Removed)
            }
            Err(ApiError::Forbidden) => {
                self.set_dimmed(id, false);
                Ok(DeleteOutcome::Forbidden)
            }
            Err(e) => {
                tracing::warn!(%id, "Could not delete comment on server: {}", e);
                Ok(DeleteOutcome::NeedsFallbackDecision(FallbackDelete {
                    id: id.clone(),
                    reason: FailureKind::from(&e),
                }))
            }
        }
    }

    /// Applies the user's answer to a failed delete. Removing drops the
    /// comment from the view and the cache only; the server copy, if any,
    /// is left alone.
    pub fn resolve_fallback(
        &mut self,
        fallback: FallbackDelete,
        remove: bool,
    ) -> Result<DeleteOutcome, ReconcileError> {
        if !remove {
            self.set_dimmed(&fallback.id, false);
            return Ok(DeleteOutcome::Cancelled);
        }

        self.cache.remove(&fallback.id)?;
        self.view.retain(|e| e.id != fallback.id);
        Ok(DeleteOutcome::RemovedLocally)
    }

    fn set_dimmed(&mut self, id: &CommentId, dimmed: bool) {
        if let Some(entry) = self.view.iter_mut().find(|e| &e.id == id) {
            entry.dimmed = dimmed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::storage::LocalStorage;

    const TOKEN: &str = "s3cret";

    /// In-memory stand-in for the server that can be switched off.
    struct FakeApi {
        state: Mutex<FakeState>,
    }

    struct FakeState {
        online: bool,
        token_ok: bool,
        next_id: i64,
        clock: i64,
        comments: Vec<Comment>,
        calls: usize,
    }

    fn unreachable() -> ApiError {
        let err = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .expect_err("malformed URL must not build");
        ApiError::Network(err)
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                state: Mutex::new(FakeState {
                    online: true,
                    token_ok: true,
                    next_id: 1,
                    clock: 1_000,
                    comments: Vec::new(),
                    calls: 0,
                }),
            }
        }

        fn set_online(&self, online: bool) {
            self.state.lock().unwrap().online = online;
        }

        fn set_token_ok(&self, ok: bool) {
            self.state.lock().unwrap().token_ok = ok;
        }

        fn calls(&self) -> usize {
            self.state.lock().unwrap().calls
        }

        fn server_comments(&self) -> Vec<Comment> {
            self.state.lock().unwrap().comments.clone()
        }

        fn seed(&self, author: &str, text: &str) -> Comment {
            let mut s = self.state.lock().unwrap();
            s.clock += 10;
            let c = Comment {
                id: s.next_id,
                author: author.to_string(),
                text: text.to_string(),
                created_at: s.clock,
                updated_at: s.clock,
            };
            s.next_id += 1;
            s.comments.push(c.clone());
            c
        }

        fn enter(&self, mutation: bool) -> Result<std::sync::MutexGuard<'_, FakeState>, ApiError> {
            let mut s = self.state.lock().unwrap();
            s.calls += 1;
            if !s.online {
                return Err(unreachable());
            }
            if mutation && !s.token_ok {
                return Err(ApiError::Forbidden);
            }
            Ok(s)
        }
    }

    impl CommentsApi for FakeApi {
        async fn list_comments(&self) -> Result<Vec<Comment>, ApiError> {
            let s = self.enter(false)?;
            let mut out = s.comments.clone();
            out.reverse();
            Ok(out)
        }

        async fn create_comment(&self, author: &str, text: &str) -> Result<Comment, ApiError> {
            drop(self.enter(false)?);
            Ok(self.seed(author, text))
        }

        async fn update_comment(&self, id: i64, text: &str) -> Result<Comment, ApiError> {
            let mut s = self.enter(true)?;
            s.clock += 10;
            let now = s.clock;
            let c = s
                .comments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or(ApiError::NotFound)?;
            c.text = text.to_string();
            c.updated_at = now;
            Ok(c.clone())
        }

        async fn delete_comment(&self, id: i64) -> Result<(), ApiError> {
            let mut s = self.enter(true)?;
            let before = s.comments.len();
            s.comments.retain(|c| c.id != id);
            if s.comments.len() == before {
                return Err(ApiError::NotFound);
            }
            Ok(())
        }
    }

    fn setup() -> (Reconciler<FakeApi>, TempDir) {
        let dir = tempdir().unwrap();
        let cache = ClientCache::new(LocalStorage::open(dir.path()).unwrap());
        cache.set_admin_token(TOKEN).unwrap();
        (Reconciler::new(FakeApi::new(), cache), dir)
    }

    fn reopen(dir: &TempDir, api: FakeApi) -> Reconciler<FakeApi> {
        let cache = ClientCache::new(LocalStorage::open(dir.path()).unwrap());
        Reconciler::new(api, cache)
    }

    fn ids(r: &Reconciler<FakeApi>) -> Vec<CommentId> {
        r.view().iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn load_puts_local_entries_above_server_entries() {
        let (mut r, _dir) = setup();
        let older = r.api().seed("Ann", "older");
        let newer = r.api().seed("Bob", "newer");
        let local = LocalComment::pending("Cid", "offline", 5);
        r.cache().upsert(&local).unwrap();

        let outcome = r.load().await;

        assert_eq!(outcome, LoadOutcome::Synced { server: 2, local: 1 });
        assert_eq!(
            ids(&r),
            vec![local.id, CommentId::Confirmed(newer.id), CommentId::Confirmed(older.id)]
        );
        assert!(r.view()[0].local);
        assert!(!r.view()[1].local);
    }

    #[tokio::test]
    async fn load_falls_back_to_cache_when_offline() {
        let (mut r, _dir) = setup();
        r.api().seed("Ann", "on server");
        let local = LocalComment::pending("Cid", "offline", 5);
        r.cache().upsert(&local).unwrap();
        r.api().set_online(false);

        let outcome = r.load().await;

        assert_eq!(
            outcome,
            LoadOutcome::LocalOnly { local: 1, reason: FailureKind::Unreachable }
        );
        assert_eq!(ids(&r), vec![local.id]);
    }

    #[tokio::test]
    async fn load_ignores_an_unreadable_cache() {
        let (mut r, dir) = setup();
        let c = r.api().seed("Ann", "on server");
        std::fs::write(dir.path().join("comments-local.json"), "[{broken").unwrap();

        let outcome = r.load().await;

        assert_eq!(outcome, LoadOutcome::Synced { server: 1, local: 0 });
        assert_eq!(ids(&r), vec![CommentId::Confirmed(c.id)]);

        r.api().set_online(false);
        let outcome = r.load().await;
        assert!(matches!(outcome, LoadOutcome::LocalOnly { local: 0, .. }));
        assert!(r.view().is_empty());
    }

    #[tokio::test]
    async fn create_promotes_provisional_entry_on_success() {
        let (mut r, _dir) = setup();
        r.api().seed("Ann", "existing");
        r.load().await;

        let provisional = r.begin_create(" Bob ", " hi ").unwrap();
        let temp_id = provisional.id().clone();
        assert!(temp_id.is_pending());
        assert_eq!(r.view()[0].id, temp_id);
        assert!(r.view()[0].local);
        assert_eq!(r.view()[0].author, "Bob");
        assert!(r.cache().read_all().unwrap().is_empty());

        let outcome = r.finish_create(provisional).await.unwrap();

        let CreateOutcome::Confirmed(saved) = outcome else {
            panic!("expected confirmation, got {:?}", outcome);
        };
        assert_eq!(saved.text, "hi");
        assert_eq!(r.view()[0].id, CommentId::Confirmed(saved.id));
        assert!(!r.view()[0].local);
        assert!(r.entry(&temp_id).is_none());
        assert_eq!(r.view().len(), 2);
        assert!(r.cache().read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_demotes_to_cache_when_offline() {
        let (mut r, _dir) = setup();
        r.api().set_online(false);

        let outcome = r.create("Ann", "offline post").await.unwrap();

        let CreateOutcome::SavedLocally { comment, reason } = outcome else {
            panic!("expected local save, got {:?}", outcome);
        };
        assert_eq!(reason, FailureKind::Unreachable);
        assert_eq!(r.cache().read_all().unwrap(), vec![comment.clone()]);
        assert_eq!(ids(&r), vec![comment.id.clone()]);
        assert!(r.view()[0].local);
    }

    #[tokio::test]
    async fn invalid_create_never_reaches_the_server() {
        let (mut r, _dir) = setup();

        let err = r.create("Ann", "   ").await.unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(ValidationError::Empty("text"))));

        let err = r.create("Ann", &"x".repeat(1001)).await.unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(ValidationError::TooLong { .. })));

        assert_eq!(r.api().calls(), 0);
        assert!(r.view().is_empty());
    }

    #[tokio::test]
    async fn offline_post_survives_reload_and_syncs_later() {
        let (mut r, dir) = setup();
        r.api().set_online(false);
        let CreateOutcome::SavedLocally { comment, .. } = r.create("Ann", "hello").await.unwrap()
        else {
            panic!("expected local save");
        };

        // Simulated reload, server still down
        let api = FakeApi::new();
        api.set_online(false);
        let mut r = reopen(&dir, api);
        r.load().await;
        assert_eq!(ids(&r), vec![comment.id.clone()]);

        // Server back, user retries
        r.api().set_online(true);
        let outcomes = r.sync_pending().await.unwrap();

        assert_eq!(outcomes.len(), 1);
        let (retried, CreateOutcome::Confirmed(saved)) = &outcomes[0] else {
            panic!("expected confirmation, got {:?}", outcomes);
        };
        assert_eq!(retried, &comment.id);
        assert_eq!(saved.text, "hello");
        assert!(r.cache().read_all().unwrap().is_empty());
        assert_eq!(ids(&r), vec![CommentId::Confirmed(saved.id)]);
        assert_eq!(r.api().server_comments().len(), 1);
    }

    #[tokio::test]
    async fn retry_keeps_entry_cached_while_offline() {
        let (mut r, _dir) = setup();
        r.api().set_online(false);
        let CreateOutcome::SavedLocally { comment, .. } = r.create("Ann", "hello").await.unwrap()
        else {
            panic!("expected local save");
        };

        let outcome = r.retry(&comment.id).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::SavedLocally { .. }));
        assert_eq!(r.cache().read_all().unwrap().len(), 1);

        let missing = CommentId::Pending("local_missing".into());
        assert!(matches!(
            r.retry(&missing).await,
            Err(ReconcileError::UnknownComment(_))
        ));
    }

    #[tokio::test]
    async fn editing_a_local_comment_stays_local() {
        let (mut r, _dir) = setup();
        r.api().set_online(false);
        let CreateOutcome::SavedLocally { comment, .. } = r.create("Ann", "hello").await.unwrap()
        else {
            panic!("expected local save");
        };
        let calls = r.api().calls();
        r.api().set_online(true);

        let outcome = r.edit(&comment.id, " fixed ").await.unwrap();

        let EditOutcome::UpdatedLocally(edited) = outcome else {
            panic!("expected local edit, got {:?}", outcome);
        };
        assert_eq!(edited.text, "fixed");
        assert!(edited.updated_at >= comment.updated_at);
        assert_eq!(r.api().calls(), calls);
        assert_eq!(r.cache().read_all().unwrap(), vec![edited]);
        assert_eq!(r.view()[0].text, "fixed");
    }

    #[tokio::test]
    async fn editing_a_server_comment_uses_the_server_answer() {
        let (mut r, _dir) = setup();
        let original = r.api().seed("Ann", "hello");
        r.load().await;
        let id = CommentId::Confirmed(original.id);

        let outcome = r.edit(&id, "hello world").await.unwrap();

        let EditOutcome::Updated(updated) = outcome else {
            panic!("expected server edit, got {:?}", outcome);
        };
        assert!(updated.updated_at > original.created_at);
        let entry = r.entry(&id).unwrap();
        assert_eq!(entry.text, "hello world");
        assert_eq!(entry.updated_at, updated.updated_at);
        assert!(r.cache().read_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_server_edit_keeps_optimistic_text() {
        let (mut r, _dir) = setup();
        let original = r.api().seed("Ann", "hello");
        r.load().await;
        let id = CommentId::Confirmed(original.id);

        r.api().set_token_ok(false);
        let outcome = r.edit(&id, "forbidden edit").await.unwrap();
        assert_eq!(outcome, EditOutcome::Failed(FailureKind::Forbidden));
        assert_eq!(r.entry(&id).unwrap().text, "forbidden edit");

        r.api().set_online(false);
        let outcome = r.edit(&id, "offline edit").await.unwrap();
        assert_eq!(outcome, EditOutcome::Failed(FailureKind::Unreachable));
        assert_eq!(r.entry(&id).unwrap().text, "offline edit");

        assert_eq!(r.api().server_comments()[0].text, "hello");
    }

    #[tokio::test]
    async fn edit_and_delete_reject_unknown_ids() {
        let (mut r, _dir) = setup();
        r.load().await;
        let id = CommentId::Confirmed(42);

        assert!(matches!(
            r.edit(&id, "text").await,
            Err(ReconcileError::UnknownComment(_))
        ));
        assert!(matches!(
            r.delete(&id, true).await,
            Err(ReconcileError::UnknownComment(_))
        ));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let (mut r, _dir) = setup();
        let c = r.api().seed("Ann", "hello");
        r.load().await;
        let calls = r.api().calls();

        let outcome = r.delete(&CommentId::Confirmed(c.id), false).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(r.view().len(), 1);
        assert!(!r.view()[0].dimmed);
        assert_eq!(r.api().calls(), calls);
    }

    #[tokio::test]
    async fn deleting_a_local_comment_never_calls_the_server() {
        let (mut r, _dir) = setup();
        r.api().set_online(false);
        let CreateOutcome::SavedLocally { comment, .. } = r.create("Ann", "hello").await.unwrap()
        else {
            panic!("expected local save");
        };
        let calls = r.api().calls();

        let outcome = r.delete(&comment.id, true).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::RemovedLocally);
        assert!(r.view().is_empty());
        assert!(r.cache().read_all().unwrap().is_empty());
        assert_eq!(r.api().calls(), calls);
    }

    #[tokio::test]
    async fn delete_removes_server_comment() {
        let (mut r, _dir) = setup();
        let keep = r.api().seed("Ann", "keep");
        let gone = r.api().seed("Bob", "gone");
        r.load().await;

        let outcome = r.delete(&CommentId::Confirmed(gone.id), true).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Removed);
        assert_eq!(ids(&r), vec![CommentId::Confirmed(keep.id)]);
        assert_eq!(r.api().server_comments(), vec![keep]);
    }

    #[tokio::test]
    async fn forbidden_delete_restores_the_entry() {
        let (mut r, _dir) = setup();
        let c = r.api().seed("Ann", "hello");
        r.load().await;
        r.api().set_token_ok(false);
        let id = CommentId::Confirmed(c.id);

        let outcome = r.delete(&id, true).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Forbidden);
        let entry = r.entry(&id).unwrap();
        assert!(!entry.dimmed);
        assert_eq!(r.api().server_comments().len(), 1);
    }

    #[tokio::test]
    async fn unreachable_delete_asks_before_dropping_locally() {
        let (mut r, _dir) = setup();
        let c = r.api().seed("Ann", "hello");
        r.load().await;
        r.api().set_online(false);
        let id = CommentId::Confirmed(c.id);

        let outcome = r.delete(&id, true).await.unwrap();
        let DeleteOutcome::NeedsFallbackDecision(fallback) = outcome else {
            panic!("expected a fallback decision, got {:?}", outcome);
        };
        assert_eq!(fallback.reason, FailureKind::Unreachable);
        assert!(r.entry(&id).unwrap().dimmed);

        // User keeps it
        let kept = r.resolve_fallback(fallback.clone(), false).unwrap();
        assert_eq!(kept, DeleteOutcome::Cancelled);
        assert!(!r.entry(&id).unwrap().dimmed);

        // User drops it; the server copy is untouched
        let DeleteOutcome::NeedsFallbackDecision(fallback) = r.delete(&id, true).await.unwrap()
        else {
            panic!("expected a fallback decision");
        };
        let dropped = r.resolve_fallback(fallback, true).unwrap();
        assert_eq!(dropped, DeleteOutcome::RemovedLocally);
        assert!(r.view().is_empty());
        assert_eq!(r.api().server_comments().len(), 1);
    }
}
