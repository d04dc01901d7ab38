use anyhow::Result;
use comments_shared::{CommentId, LocalComment};

use crate::storage::LocalStorage;

const LOCAL_COMMENTS_KEY: &str = "comments:local";
const ADMIN_FLAG_KEY: &str = "comments:isAdmin";
const ADMIN_TOKEN_KEY: &str = "comments:adminToken";

/// Result of flipping admin mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminToggle {
    Disabled,
    Enabled,
    /// Admin mode is on but no token is stored; the caller should ask for one.
    EnabledNeedsToken,
}

/// Client-side persisted state: comments the server has not confirmed, and
/// the admin-mode settings. Nothing here leaves the machine except through
/// explicit API calls.
#[derive(Debug, Clone)]
pub struct ClientCache {
    storage: LocalStorage,
}

impl ClientCache {
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Unsynced comments, newest first.
    pub fn read_all(&self) -> Result<Vec<LocalComment>> {
        Ok(self.storage.get(LOCAL_COMMENTS_KEY)?.unwrap_or_default())
    }

    fn write_all(&self, comments: &[LocalComment]) -> Result<()> {
        self.storage.set(LOCAL_COMMENTS_KEY, comments)
    }

    /// Replaces the entry with the same id, or prepends it as the newest.
    pub fn upsert(&self, comment: &LocalComment) -> Result<()> {
        let mut comments = self.read_all()?;
        match comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => *existing = comment.clone(),
            None => comments.insert(0, comment.clone()),
        }
        self.write_all(&comments)
    }

    /// Removes the entry with this id. Absent ids are ignored.
    pub fn remove(&self, id: &CommentId) -> Result<()> {
        let mut comments = self.read_all()?;
        let before = comments.len();
        comments.retain(|c| &c.id != id);
        if comments.len() != before {
            self.write_all(&comments)?;
        }
        Ok(())
    }

    pub fn get(&self, id: &CommentId) -> Result<Option<LocalComment>> {
        Ok(self.read_all()?.into_iter().find(|c| &c.id == id))
    }

    // ============ Admin mode ============

    pub fn is_admin(&self) -> Result<bool> {
        Ok(self.storage.get(ADMIN_FLAG_KEY)?.unwrap_or(false))
    }

    pub fn set_admin(&self, on: bool) -> Result<()> {
        self.storage.set(ADMIN_FLAG_KEY, &on)
    }

    pub fn admin_token(&self) -> Result<Option<String>> {
        let token: Option<String> = self.storage.get(ADMIN_TOKEN_KEY)?;
        Ok(token.filter(|t| !t.is_empty()))
    }

    pub fn set_admin_token(&self, token: &str) -> Result<()> {
        self.storage.set(ADMIN_TOKEN_KEY, token)
    }

    pub fn clear_admin_token(&self) -> Result<()> {
        self.storage.remove(ADMIN_TOKEN_KEY)
    }

    pub fn toggle_admin(&self) -> Result<AdminToggle> {
        let on = !self.is_admin()?;
        self.set_admin(on)?;

        if !on {
            return Ok(AdminToggle::Disabled);
        }
        if self.admin_token()?.is_none() {
            return Ok(AdminToggle::EnabledNeedsToken);
        }
        Ok(AdminToggle::Enabled)
    }
}
