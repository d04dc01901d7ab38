use comments_shared::{now_millis, Comment};

use super::DbPool;

/// Handle to the `comments` table. Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct CommentStore {
    pool: DbPool,
}

impl CommentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All comments, newest first.
    pub async fn list(&self) -> Result<Vec<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, author, text, created_at, updated_at
            FROM comments
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Comment>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, author, text, created_at, updated_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(&self, author: &str, text: &str) -> Result<Comment, sqlx::Error> {
        let now = now_millis();

        sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (author, text, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, author, text, created_at, updated_at
            "#,
        )
        .bind(author)
        .bind(text)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    /// Rewrites the text. `updated_at` always moves strictly forward, even when
    /// two edits land in the same millisecond. Returns `None` if no row matched.
    pub async fn update(&self, id: i64, text: &str) -> Result<Option<Comment>, sqlx::Error> {
        let now = now_millis();

        sqlx::query_as::<_, Comment>(
            r#"
            UPDATE comments
            SET text = ?, updated_at = MAX(?, updated_at + 1)
            WHERE id = ?
            RETURNING id, author, text, created_at, updated_at
            "#,
        )
        .bind(text)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns `false` if no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
