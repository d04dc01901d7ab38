use chrono::{Local, TimeZone};
use comments_shared::{Comment, CommentId, LocalComment};

/// One rendered row of the merged comment list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry {
    pub id: CommentId,
    pub author: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
    /// Not (yet) known to the server.
    pub local: bool,
    /// Removal is in flight or awaiting a decision.
    pub dimmed: bool,
}

impl ViewEntry {
    pub fn is_edited(&self) -> bool {
        self.updated_at != self.created_at
    }
}

impl From<Comment> for ViewEntry {
    fn from(c: Comment) -> Self {
        Self {
            id: CommentId::Confirmed(c.id),
            author: c.author,
            text: c.text,
            created_at: c.created_at,
            updated_at: c.updated_at,
            local: false,
            dimmed: false,
        }
    }
}

impl From<LocalComment> for ViewEntry {
    fn from(c: LocalComment) -> Self {
        Self {
            id: c.id,
            author: c.author,
            text: c.text,
            created_at: c.created_at,
            updated_at: c.updated_at,
            local: true,
            dimmed: false,
        }
    }
}

impl From<&ViewEntry> for LocalComment {
    fn from(e: &ViewEntry) -> Self {
        Self {
            id: e.id.clone(),
            author: e.author.clone(),
            text: e.text.clone(),
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

fn format_time(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

/// Renders one entry as a header line followed by the indented text.
pub fn render_entry(entry: &ViewEntry) -> String {
    let author = if entry.author.is_empty() {
        "Anonymous"
    } else {
        entry.author.as_str()
    };

    let mut header = format!("[{}] {} • {}", entry.id, author, format_time(entry.created_at));
    if entry.is_edited() {
        header.push_str(&format!(" • edited {}", format_time(entry.updated_at)));
    }
    if entry.local {
        header.push_str(" • local (not synced)");
    }
    if entry.dimmed {
        header.push_str(" • removing…");
    }

    let body: Vec<String> = entry.text.lines().map(|l| format!("    {}", l)).collect();
    format!("{}\n{}", header, body.join("\n"))
}

pub fn render_list(entries: &[ViewEntry]) -> String {
    if entries.is_empty() {
        return "No comments yet.".to_string();
    }
    entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}
