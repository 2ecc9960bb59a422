use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

/// Static site pages (terms, privacy, cookies, refunds) looked up by slug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct LegalPage {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for LegalPage {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            title: row.try_get("title").map_err(AppError::from)?,
            slug: row.try_get("slug").map_err(AppError::from)?,
            content: row.try_get("content").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LegalPageInput {
    pub title: String,
    pub slug: String,
    pub content: String,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "legal_pages".to_string())
}

pub async fn list(pool: &SqlitePool) -> AppResult<Vec<LegalPage>> {
    let rows = sqlx::query("SELECT * FROM legal_pages ORDER BY title")
        .fetch_all(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "list"))?;
    rows.iter().map(LegalPage::try_from).collect()
}

/// Slug lookup; absence is `Ok(None)`, never an error.
pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> AppResult<Option<LegalPage>> {
    let row = sqlx::query("SELECT * FROM legal_pages WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "get_by_slug").with_context("slug", slug.to_string()))?;
    row.as_ref().map(LegalPage::try_from).transpose()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<LegalPage>> {
    let row = repo::get_row(pool, "legal_pages", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(LegalPage::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &LegalPageInput) -> AppResult<LegalPage> {
    repo::ensure_slug(&input.slug)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO legal_pages (id, title, slug, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create").with_context("slug", input.slug.clone()))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found after create"))
}

pub async fn update(pool: &SqlitePool, id: &str, input: &LegalPageInput) -> AppResult<LegalPage> {
    repo::ensure_slug(&input.slug)?;
    let res = sqlx::query(
        "UPDATE legal_pages SET title = ?, slug = ?, content = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(now_ms())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "update").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found")
            .with_context("id", id.to_string()));
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found after update"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM legal_pages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found")
            .with_context("id", id.to_string()));
    }
    Ok(())
}

/// Insert-or-update keyed on the unique slug; the seed path relies on this
/// never growing the row count on re-runs.
pub async fn upsert(pool: &SqlitePool, input: &LegalPageInput) -> AppResult<LegalPage> {
    repo::ensure_slug(&input.slug)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO legal_pages (id, title, slug, content, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) \
         ON CONFLICT(slug) DO UPDATE SET \
           title = excluded.title, \
           content = excluded.content, \
           updated_at = excluded.updated_at",
    )
    .bind(&id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "upsert").with_context("slug", input.slug.clone()))?;

    get_by_slug(pool, &input.slug)
        .await?
        .ok_or_else(|| AppError::new("LEGAL_PAGE/NOT_FOUND", "Legal page not found after upsert"))
}
