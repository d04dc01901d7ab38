/// Outcome of checking a caller's admin credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Gate for mutating requests.
///
/// With no secret configured every caller is allowed (open/study mode).
/// Otherwise the supplied token must match the secret exactly.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    secret: Option<String>,
}

impl AccessGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn is_open(&self) -> bool {
        self.secret.is_none()
    }

    pub fn authorize(&self, supplied: Option<&str>) -> Access {
        match (&self.secret, supplied) {
            (None, _) => Access::Allow,
            (Some(secret), Some(token)) if token == secret => Access::Allow,
            _ => Access::Deny,
        }
    }
}
