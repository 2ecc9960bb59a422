use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Testimonial {
    pub id: String,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub visa_type: Option<String>,
    #[ts(type = "number")]
    pub rating: i64,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avatar_url: Option<String>,
    pub approved: bool,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for Testimonial {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            client_name: row.try_get("client_name").map_err(AppError::from)?,
            country: row.try_get("country").map_err(AppError::from)?,
            visa_type: row.try_get("visa_type").map_err(AppError::from)?,
            rating: row.try_get("rating").map_err(AppError::from)?,
            comment: row.try_get("comment").map_err(AppError::from)?,
            avatar_url: row.try_get("avatar_url").map_err(AppError::from)?,
            approved: row
                .try_get::<i64, _>("approved")
                .map(|value| value != 0)
                .map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TestimonialInput {
    pub client_name: String,
    #[serde(default)]
    #[ts(optional)]
    pub country: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub visa_type: Option<String>,
    #[ts(type = "number")]
    pub rating: i64,
    pub comment: String,
    #[serde(default)]
    #[ts(optional)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "testimonials".to_string())
}

fn validate(input: &TestimonialInput) -> AppResult<()> {
    if input.client_name.trim().is_empty() {
        return Err(AppError::new(
            "TESTIMONIAL/CLIENT_REQUIRED",
            "client_name is required",
        ));
    }
    if !(1..=5).contains(&input.rating) {
        return Err(
            AppError::new("TESTIMONIAL/RATING_RANGE", "rating must be between 1 and 5")
                .with_context("rating", input.rating.to_string()),
        );
    }
    Ok(())
}

/// Public pages pass `only_approved = true`; the admin panel passes `false`
/// and sees the moderation queue too.
pub async fn list(pool: &SqlitePool, only_approved: bool) -> AppResult<Vec<Testimonial>> {
    let sql = if only_approved {
        "SELECT * FROM testimonials WHERE approved = 1 ORDER BY created_at DESC"
    } else {
        "SELECT * FROM testimonials ORDER BY created_at DESC"
    };
    let rows = sqlx::query(sql)
        .fetch_all(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "list"))?;
    rows.iter().map(Testimonial::try_from).collect()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Testimonial>> {
    let row = repo::get_row(pool, "testimonials", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(Testimonial::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &TestimonialInput) -> AppResult<Testimonial> {
    validate(input)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO testimonials \
           (id, client_name, country, visa_type, rating, comment, avatar_url, approved, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.client_name)
    .bind(&input.country)
    .bind(&input.visa_type)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(&input.avatar_url)
    .bind(input.approved as i64)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create"))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found after create"))
}

pub async fn update(pool: &SqlitePool, id: &str, input: &TestimonialInput) -> AppResult<Testimonial> {
    validate(input)?;
    let res = sqlx::query(
        "UPDATE testimonials SET \
           client_name = ?, country = ?, visa_type = ?, rating = ?, comment = ?, \
           avatar_url = ?, approved = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&input.client_name)
    .bind(&input.country)
    .bind(&input.visa_type)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(&input.avatar_url)
    .bind(input.approved as i64)
    .bind(now_ms())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "update").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found")
            .with_context("id", id.to_string()));
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found after update"))
}

pub async fn set_approved(pool: &SqlitePool, id: &str, approved: bool) -> AppResult<Testimonial> {
    let res = sqlx::query("UPDATE testimonials SET approved = ?, updated_at = ? WHERE id = ?")
        .bind(approved as i64)
        .bind(now_ms())
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "set_approved").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found")
            .with_context("id", id.to_string()));
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found after update"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM testimonials WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("TESTIMONIAL/NOT_FOUND", "Testimonial not found")
            .with_context("id", id.to_string()));
    }
    Ok(())
}
