use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub featured_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub published_at: Option<i64>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for Blog {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            title: row.try_get("title").map_err(AppError::from)?,
            slug: row.try_get("slug").map_err(AppError::from)?,
            content: row.try_get("content").map_err(AppError::from)?,
            excerpt: row.try_get("excerpt").map_err(AppError::from)?,
            featured_image: row.try_get("featured_image").map_err(AppError::from)?,
            published_at: row.try_get("published_at").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BlogInput {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    #[ts(optional)]
    pub excerpt: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub featured_image: Option<String>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub published_at: Option<i64>,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "blogs".to_string())
}

/// Published posts, newest first. Drafts (no `published_at`) are admin-only.
pub async fn list_published(pool: &SqlitePool) -> AppResult<Vec<Blog>> {
    let rows = sqlx::query(
        "SELECT * FROM blogs WHERE published_at IS NOT NULL ORDER BY published_at DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "list_published"))?;
    rows.iter().map(Blog::try_from).collect()
}

pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Blog>> {
    let rows = sqlx::query("SELECT * FROM blogs ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "list_all"))?;
    rows.iter().map(Blog::try_from).collect()
}

pub async fn get_by_slug(pool: &SqlitePool, slug: &str) -> AppResult<Option<Blog>> {
    let row = sqlx::query("SELECT * FROM blogs WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "get_by_slug").with_context("slug", slug.to_string()))?;
    row.as_ref().map(Blog::try_from).transpose()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Blog>> {
    let row = repo::get_row(pool, "blogs", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(Blog::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &BlogInput) -> AppResult<Blog> {
    repo::ensure_slug(&input.slug)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO blogs \
           (id, title, slug, content, excerpt, featured_image, published_at, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(&input.excerpt)
    .bind(&input.featured_image)
    .bind(input.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create").with_context("slug", input.slug.clone()))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("BLOG/NOT_FOUND", "Blog not found after create"))
}

pub async fn update(pool: &SqlitePool, id: &str, input: &BlogInput) -> AppResult<Blog> {
    repo::ensure_slug(&input.slug)?;
    let res = sqlx::query(
        "UPDATE blogs SET \
           title = ?, slug = ?, content = ?, excerpt = ?, featured_image = ?, \
           published_at = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(&input.excerpt)
    .bind(&input.featured_image)
    .bind(input.published_at)
    .bind(now_ms())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "update").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(
            AppError::new("BLOG/NOT_FOUND", "Blog not found").with_context("id", id.to_string())
        );
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("BLOG/NOT_FOUND", "Blog not found after update"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM blogs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(
            AppError::new("BLOG/NOT_FOUND", "Blog not found").with_context("id", id.to_string())
        );
    }
    Ok(())
}

/// Seed path: insert-or-update keyed on the unique slug.
pub async fn upsert(pool: &SqlitePool, input: &BlogInput) -> AppResult<Blog> {
    repo::ensure_slug(&input.slug)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO blogs \
           (id, title, slug, content, excerpt, featured_image, published_at, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(slug) DO UPDATE SET \
           title = excluded.title, \
           content = excluded.content, \
           excerpt = excluded.excerpt, \
           featured_image = excluded.featured_image, \
           published_at = excluded.published_at, \
           updated_at = excluded.updated_at",
    )
    .bind(&id)
    .bind(&input.title)
    .bind(&input.slug)
    .bind(&input.content)
    .bind(&input.excerpt)
    .bind(&input.featured_image)
    .bind(input.published_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "upsert").with_context("slug", input.slug.clone()))?;

    get_by_slug(pool, &input.slug)
        .await?
        .ok_or_else(|| AppError::new("BLOG/NOT_FOUND", "Blog not found after upsert"))
}
