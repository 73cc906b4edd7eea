use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use reelbin_core::models::{CatalogStats, VideoRecord};
use reelbin_core::AppError;

/// Fields for a new catalog entry; id and timestamps are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub file_code: String,
    pub embed_code: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub status: String,
}

/// Catalog repository
///
/// All reads return domain models; writes return the stored row so callers
/// never have to re-fetch.
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All videos, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<VideoRecord>, AppError> {
        let rows = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            SELECT * FROM videos
            ORDER BY upload_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            SELECT * FROM videos WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn find_by_file_code(&self, file_code: &str) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            SELECT * FROM videos WHERE file_code = $1
            "#,
        )
        .bind(file_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", file_code = %video.file_code))]
    pub async fn create(&self, video: NewVideo) -> Result<VideoRecord, AppError> {
        let now = Utc::now();

        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            INSERT INTO videos (
                id, file_code, embed_code, title, thumbnail_url,
                duration, status, views, upload_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(video.file_code)
        .bind(video.embed_code)
        .bind(video.title)
        .bind(video.thumbnail_url)
        .bind(video.duration)
        .bind(video.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Delete one video; false when the id does not exist.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete"))]
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM videos WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the view counter and return the updated row.
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update"))]
    pub async fn increment_views(&self, id: Uuid) -> Result<Option<VideoRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRecord>(
            r#"
            UPDATE videos
            SET views = views + 1, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    pub async fn stats(&self) -> Result<CatalogStats, AppError> {
        let (total_videos, total_views): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(views), 0)::BIGINT FROM videos
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogStats {
            total_videos,
            total_views,
        })
    }
}
