use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

/// Catalog item (photo service, courier, translation, ...). No workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct AddonService {
    pub id: String,
    pub name: String,
    #[ts(type = "number")]
    pub price: i64,
    #[ts(type = "number")]
    pub discount_percentage: i64,
    #[ts(type = "number")]
    pub delivery_days: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub image_url: Option<String>,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for AddonService {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            name: row.try_get("name").map_err(AppError::from)?,
            price: row.try_get("price").map_err(AppError::from)?,
            discount_percentage: row.try_get("discount_percentage").map_err(AppError::from)?,
            delivery_days: row.try_get("delivery_days").map_err(AppError::from)?,
            description: row.try_get("description").map_err(AppError::from)?,
            image_url: row.try_get("image_url").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonServiceInput {
    pub name: String,
    #[ts(type = "number")]
    pub price: i64,
    #[serde(default)]
    #[ts(type = "number")]
    pub discount_percentage: i64,
    #[serde(default)]
    #[ts(type = "number")]
    pub delivery_days: i64,
    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub image_url: Option<String>,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "addon_services".to_string())
}

fn validate(input: &AddonServiceInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::new("ADDON/NAME_REQUIRED", "name is required"));
    }
    if input.price < 0 {
        return Err(AppError::new("ADDON/PRICE_NEGATIVE", "price must not be negative"));
    }
    if !(0..=100).contains(&input.discount_percentage) {
        return Err(AppError::new(
            "ADDON/DISCOUNT_RANGE",
            "discount_percentage must be between 0 and 100",
        ));
    }
    Ok(())
}

pub async fn list(pool: &SqlitePool) -> AppResult<Vec<AddonService>> {
    let rows = sqlx::query("SELECT * FROM addon_services ORDER BY price ASC")
        .fetch_all(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "list"))?;
    rows.iter().map(AddonService::try_from).collect()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<AddonService>> {
    let row = repo::get_row(pool, "addon_services", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(AddonService::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &AddonServiceInput) -> AppResult<AddonService> {
    validate(input)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO addon_services \
           (id, name, price, discount_percentage, delivery_days, description, image_url, \
            created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(input.price)
    .bind(input.discount_percentage)
    .bind(input.delivery_days)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create"))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("ADDON/NOT_FOUND", "Addon service not found after create"))
}

pub async fn update(pool: &SqlitePool, id: &str, input: &AddonServiceInput) -> AppResult<AddonService> {
    validate(input)?;
    let res = sqlx::query(
        "UPDATE addon_services SET \
           name = ?, price = ?, discount_percentage = ?, delivery_days = ?, description = ?, \
           image_url = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(input.discount_percentage)
    .bind(input.delivery_days)
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(now_ms())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "update").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("ADDON/NOT_FOUND", "Addon service not found")
            .with_context("id", id.to_string()));
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("ADDON/NOT_FOUND", "Addon service not found after update"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM addon_services WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("ADDON/NOT_FOUND", "Addon service not found")
            .with_context("id", id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_must_be_a_percentage() {
        let input = AddonServiceInput {
            name: "Express courier".into(),
            price: 2500,
            discount_percentage: 120,
            delivery_days: 2,
            description: None,
            image_url: None,
        };
        assert_eq!(validate(&input).unwrap_err().code(), "ADDON/DISCOUNT_RANGE");
    }
}
