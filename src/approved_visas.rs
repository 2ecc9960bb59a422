use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

/// Gallery of recently approved visas shown on the landing page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct ApprovedVisa {
    pub id: String,
    pub country: String,
    pub visa_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional, type = "number")]
    pub approval_date: Option<i64>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for ApprovedVisa {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            country: row.try_get("country").map_err(AppError::from)?,
            visa_type: row.try_get("visa_type").map_err(AppError::from)?,
            image_url: row.try_get("image_url").map_err(AppError::from)?,
            approval_date: row.try_get("approval_date").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApprovedVisaInput {
    pub country: String,
    pub visa_type: String,
    #[serde(default)]
    #[ts(optional)]
    pub image_url: Option<String>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub approval_date: Option<i64>,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "approved_visas".to_string())
}

pub async fn list(pool: &SqlitePool) -> AppResult<Vec<ApprovedVisa>> {
    let rows = sqlx::query(
        "SELECT * FROM approved_visas ORDER BY COALESCE(approval_date, created_at) DESC",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "list"))?;
    rows.iter().map(ApprovedVisa::try_from).collect()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<ApprovedVisa>> {
    let row = repo::get_row(pool, "approved_visas", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(ApprovedVisa::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &ApprovedVisaInput) -> AppResult<ApprovedVisa> {
    if input.country.trim().is_empty() || input.visa_type.trim().is_empty() {
        return Err(AppError::new(
            "APPROVED_VISA/FIELDS_REQUIRED",
            "country and visa_type are required",
        ));
    }
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO approved_visas \
           (id, country, visa_type, image_url, approval_date, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.country)
    .bind(&input.visa_type)
    .bind(&input.image_url)
    .bind(input.approval_date)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create"))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("APPROVED_VISA/NOT_FOUND", "Entry not found after create"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM approved_visas WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("APPROVED_VISA/NOT_FOUND", "Entry not found")
            .with_context("id", id.to_string()));
    }
    Ok(())
}
