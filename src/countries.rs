use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

/// Structured sub-documents stored as JSON text columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct EmbassyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub hours: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct ProcessingStep {
    #[ts(type = "number")]
    pub step: i64,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Country {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub flag_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub entry_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub validity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub length_of_stay: Option<String>,
    pub visa_includes: Vec<String>,
    pub embassy_details: EmbassyDetails,
    pub processing_steps: Vec<ProcessingStep>,
    pub faq: Vec<FaqItem>,
    #[ts(type = "number")]
    pub popularity: i64,
    #[ts(type = "number")]
    pub min_price: i64,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

fn decode_json_column<T: serde::de::DeserializeOwned>(
    raw: &str,
    column: &str,
) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::from(e).with_context("column", column.to_string()))
}

impl TryFrom<&SqliteRow> for Country {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let visa_includes: String = row.try_get("visa_includes").map_err(AppError::from)?;
        let embassy_details: String = row.try_get("embassy_details").map_err(AppError::from)?;
        let processing_steps: String = row.try_get("processing_steps").map_err(AppError::from)?;
        let faq: String = row.try_get("faq").map_err(AppError::from)?;
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            name: row.try_get("name").map_err(AppError::from)?,
            flag_url: row.try_get("flag_url").map_err(AppError::from)?,
            banner_url: row.try_get("banner_url").map_err(AppError::from)?,
            description: row.try_get("description").map_err(AppError::from)?,
            entry_type: row.try_get("entry_type").map_err(AppError::from)?,
            validity: row.try_get("validity").map_err(AppError::from)?,
            length_of_stay: row.try_get("length_of_stay").map_err(AppError::from)?,
            visa_includes: decode_json_column(&visa_includes, "visa_includes")?,
            embassy_details: decode_json_column(&embassy_details, "embassy_details")?,
            processing_steps: decode_json_column(&processing_steps, "processing_steps")?,
            faq: decode_json_column(&faq, "faq")?,
            popularity: row.try_get("popularity").map_err(AppError::from)?,
            min_price: row.try_get("min_price").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CountryInput {
    pub name: String,
    #[serde(default)]
    #[ts(optional)]
    pub flag_url: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub banner_url: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub description: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub entry_type: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub validity: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub length_of_stay: Option<String>,
    #[serde(default)]
    pub visa_includes: Vec<String>,
    #[serde(default)]
    pub embassy_details: EmbassyDetails,
    #[serde(default)]
    pub processing_steps: Vec<ProcessingStep>,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    #[serde(default)]
    #[ts(type = "number")]
    pub popularity: i64,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "countries".to_string())
}

fn validate(input: &CountryInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::new("COUNTRY/NAME_REQUIRED", "name is required"));
    }
    Ok(())
}

fn encode<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value).map_err(AppError::from)
}

/// Browse order: most popular first, ties alphabetical.
pub async fn list(pool: &SqlitePool) -> AppResult<Vec<Country>> {
    let rows = sqlx::query("SELECT * FROM countries ORDER BY popularity DESC, name ASC")
        .fetch_all(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "list"))?;
    rows.iter().map(Country::try_from).collect()
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<Country>> {
    let row = repo::get_row(pool, "countries", id)
        .await
        .map_err(|e| ctx(e, "get").with_context("id", id.to_string()))?;
    row.as_ref().map(Country::try_from).transpose()
}

pub async fn create(pool: &SqlitePool, input: &CountryInput) -> AppResult<Country> {
    validate(input)?;
    let id = new_uuid_v7();
    let now = now_ms();
    sqlx::query(
        "INSERT INTO countries \
           (id, name, flag_url, banner_url, description, entry_type, validity, length_of_stay, \
            visa_includes, embassy_details, processing_steps, faq, popularity, min_price, \
            created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.flag_url)
    .bind(&input.banner_url)
    .bind(&input.description)
    .bind(&input.entry_type)
    .bind(&input.validity)
    .bind(&input.length_of_stay)
    .bind(encode(&input.visa_includes)?)
    .bind(encode(&input.embassy_details)?)
    .bind(encode(&input.processing_steps)?)
    .bind(encode(&input.faq)?)
    .bind(input.popularity)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "create").with_context("name", input.name.clone()))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("COUNTRY/NOT_FOUND", "Country not found after create"))
}

pub async fn update(pool: &SqlitePool, id: &str, input: &CountryInput) -> AppResult<Country> {
    validate(input)?;
    let res = sqlx::query(
        "UPDATE countries SET \
           name = ?, flag_url = ?, banner_url = ?, description = ?, entry_type = ?, \
           validity = ?, length_of_stay = ?, visa_includes = ?, embassy_details = ?, \
           processing_steps = ?, faq = ?, popularity = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&input.name)
    .bind(&input.flag_url)
    .bind(&input.banner_url)
    .bind(&input.description)
    .bind(&input.entry_type)
    .bind(&input.validity)
    .bind(&input.length_of_stay)
    .bind(encode(&input.visa_includes)?)
    .bind(encode(&input.embassy_details)?)
    .bind(encode(&input.processing_steps)?)
    .bind(encode(&input.faq)?)
    .bind(input.popularity)
    .bind(now_ms())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "update").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("COUNTRY/NOT_FOUND", "Country not found")
            .with_context("id", id.to_string()));
    }
    get(pool, id)
        .await?
        .ok_or_else(|| AppError::new("COUNTRY/NOT_FOUND", "Country not found after update"))
}

/// Deleting a country cascades to its packages and checklist items.
pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM countries WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "delete").with_context("id", id.to_string()))?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("COUNTRY/NOT_FOUND", "Country not found")
            .with_context("id", id.to_string()));
    }
    Ok(())
}

/// Recompute the cached cheapest-package price. The package write path keeps
/// this in sync transactionally; this standalone form exists for maintenance.
pub async fn refresh_min_price(pool: &SqlitePool, id: &str) -> AppResult<i64> {
    sqlx::query(
        "UPDATE countries SET min_price = \
           (SELECT COALESCE(MIN(total_price), 0) FROM visa_packages WHERE country_id = ?) \
         WHERE id = ?",
    )
    .bind(id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| ctx(AppError::from(e), "refresh_min_price").with_context("id", id.to_string()))?;
    let min_price: i64 = sqlx::query_scalar("SELECT min_price FROM countries WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "refresh_min_price").with_context("id", id.to_string()))?
        .ok_or_else(|| {
            AppError::new("COUNTRY/NOT_FOUND", "Country not found").with_context("id", id.to_string())
        })?;
    Ok(min_price)
}
