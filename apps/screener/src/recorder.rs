//! Recorder — external collaborator seam persisting shortlisted candidates.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::info;

use crate::screening::pipeline::ShortlistEntry;

#[async_trait]
pub trait Recorder: Send + Sync {
    /// Appends one shortlisted candidate. Called only after notification
    /// succeeded; entries are immutable once written.
    async fn record(&self, entry: &ShortlistEntry) -> Result<()>;
}

/// SQLite-backed recorder writing to the `candidates` table.
#[derive(Clone)]
pub struct SqliteRecorder {
    pool: SqlitePool,
}

impl SqliteRecorder {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Recorder for SqliteRecorder {
    async fn record(&self, entry: &ShortlistEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO candidates (name, email, score, resume_file, recorded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&entry.name)
        .bind(&entry.email)
        .bind(entry.score as f64)
        .bind(&entry.resume_file)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        info!(name = %entry.name, file = %entry.resume_file, "candidate recorded");
        Ok(())
    }
}
