use futures::FutureExt;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{db::run_in_tx, id::new_uuid_v7, time::now_ms, AppError, AppResult};

pub const DEFAULT_PACKAGE_NAME: &str = "Standard Visa Package";
pub const DEFAULT_GOVERNMENT_FEE: i64 = 6000;
pub const DEFAULT_SERVICE_FEE: i64 = 3000;
pub const DEFAULT_PROCESSING_DAYS: i64 = 15;

/// Persisted shape of a visa package. Prices are integer minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct VisaPackage {
    pub id: String,
    pub country_id: String,
    pub name: String,
    #[ts(type = "number")]
    pub government_fee: i64,
    #[ts(type = "number")]
    pub service_fee: i64,
    #[ts(type = "number")]
    pub processing_days: i64,
    #[ts(type = "number")]
    pub total_price: i64,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for VisaPackage {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            country_id: row.try_get("country_id").map_err(AppError::from)?,
            name: row.try_get("name").map_err(AppError::from)?,
            government_fee: row.try_get("government_fee").map_err(AppError::from)?,
            service_fee: row.try_get("service_fee").map_err(AppError::from)?,
            processing_days: row.try_get("processing_days").map_err(AppError::from)?,
            total_price: row.try_get("total_price").map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

/// What the admin UI works with: the stored record plus the application-level
/// activation flag. The flag is never a column; it exists only on this
/// projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct VisaPackageView {
    #[serde(flatten)]
    pub package: VisaPackage,
    pub is_active: bool,
}

impl VisaPackageView {
    pub fn active(package: VisaPackage) -> Self {
        Self {
            package,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VisaPackageInput {
    #[serde(default)]
    #[ts(optional)]
    pub id: Option<String>,
    #[serde(default)]
    pub country_id: String,
    #[serde(default)]
    #[ts(optional)]
    pub name: Option<String>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub government_fee: Option<i64>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub service_fee: Option<i64>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub processing_days: Option<i64>,
    #[serde(default)]
    #[ts(optional, type = "number")]
    pub total_price: Option<i64>,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "visa_packages".to_string())
}

/// Fee arithmetic for a package payload: the stored total is always
/// `government_fee + service_fee` unless the caller supplied one.
pub fn resolve_fees(input: &VisaPackageInput) -> (i64, i64, i64) {
    let government_fee = input.government_fee.unwrap_or(0);
    let service_fee = input.service_fee.unwrap_or(0);
    let total_price = input
        .total_price
        .unwrap_or(government_fee + service_fee);
    (government_fee, service_fee, total_price)
}

fn validate(input: &VisaPackageInput) -> AppResult<()> {
    if input.country_id.trim().is_empty() {
        return Err(AppError::new(
            "VISA_PACKAGE/COUNTRY_REQUIRED",
            "country_id is required for visa packages",
        ));
    }
    let (government_fee, service_fee, total_price) = resolve_fees(input);
    if government_fee < 0 || service_fee < 0 || total_price < 0 {
        return Err(AppError::new(
            "VISA_PACKAGE/FEE_NEGATIVE",
            "Fees must not be negative",
        ));
    }
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<VisaPackage>> {
    let row = sqlx::query("SELECT * FROM visa_packages WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| ctx(AppError::from(e), "get").with_context("id", id.to_string()))?;
    row.as_ref().map(VisaPackage::try_from).transpose()
}

/// Packages for a country, cheapest first.
pub async fn list_for_country(pool: &SqlitePool, country_id: &str) -> AppResult<Vec<VisaPackage>> {
    let rows = sqlx::query(
        "SELECT * FROM visa_packages WHERE country_id = ? ORDER BY total_price ASC, name ASC",
    )
    .bind(country_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        ctx(AppError::from(e), "list_for_country").with_context("country_id", country_id.to_string())
    })?;
    rows.iter().map(VisaPackage::try_from).collect()
}

/// The projection the admin panel renders: every stored offering is active.
pub async fn views_for_country(
    pool: &SqlitePool,
    country_id: &str,
) -> AppResult<Vec<VisaPackageView>> {
    let packages = list_for_country(pool, country_id).await?;
    Ok(packages.into_iter().map(VisaPackageView::active).collect())
}

async fn country_exists(pool: &SqlitePool, country_id: &str) -> AppResult<bool> {
    let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM countries WHERE id = ?")
        .bind(country_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)?;
    Ok(exists.is_some())
}

/// Create-or-update a package. Validation happens before any query; the row
/// write and the country's cached `min_price` refresh share one transaction.
pub async fn save(pool: &SqlitePool, input: &VisaPackageInput) -> AppResult<VisaPackage> {
    validate(input)?;
    let country_id = input.country_id.trim().to_string();
    if !country_exists(pool, &country_id).await? {
        return Err(AppError::new("COUNTRY/NOT_FOUND", "Country not found")
            .with_context("country_id", country_id));
    }

    let (government_fee, service_fee, total_price) = resolve_fees(input);
    let id = input.id.clone().unwrap_or_else(new_uuid_v7);
    let name = input
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string());
    let processing_days = input.processing_days.unwrap_or(DEFAULT_PROCESSING_DAYS);
    let now = now_ms();

    let tx_id = id.clone();
    let tx_country = country_id.clone();
    run_in_tx::<_, AppError, _>(pool, move |tx| {
        async move {
            sqlx::query(
                "INSERT INTO visa_packages \
                   (id, country_id, name, government_fee, service_fee, processing_days, \
                    total_price, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(id) DO UPDATE SET \
                   country_id = excluded.country_id, \
                   name = excluded.name, \
                   government_fee = excluded.government_fee, \
                   service_fee = excluded.service_fee, \
                   processing_days = excluded.processing_days, \
                   total_price = excluded.total_price, \
                   updated_at = excluded.updated_at",
            )
            .bind(&tx_id)
            .bind(&tx_country)
            .bind(&name)
            .bind(government_fee)
            .bind(service_fee)
            .bind(processing_days)
            .bind(total_price)
            .bind(now)
            .bind(now)
            .execute(&mut **tx)
            .await?;

            sqlx::query(
                "UPDATE countries SET min_price = \
                   (SELECT COALESCE(MIN(total_price), 0) FROM visa_packages WHERE country_id = ?) \
                 WHERE id = ?",
            )
            .bind(&tx_country)
            .bind(&tx_country)
            .execute(&mut **tx)
            .await?;

            Ok(())
        }
        .boxed()
    })
    .await
    .map_err(|e| ctx(e, "save").with_context("id", id.clone()))?;

    get(pool, &id)
        .await?
        .ok_or_else(|| AppError::new("VISA_PACKAGE/NOT_FOUND", "Package not found after save"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    let package = get(pool, id).await?.ok_or_else(|| {
        AppError::new("VISA_PACKAGE/NOT_FOUND", "Package not found")
            .with_context("id", id.to_string())
    })?;
    let tx_id = id.to_string();
    let tx_country = package.country_id.clone();
    run_in_tx::<_, AppError, _>(pool, move |tx| {
        async move {
            sqlx::query("DELETE FROM visa_packages WHERE id = ?")
                .bind(&tx_id)
                .execute(&mut **tx)
                .await?;
            sqlx::query(
                "UPDATE countries SET min_price = \
                   (SELECT COALESCE(MIN(total_price), 0) FROM visa_packages WHERE country_id = ?) \
                 WHERE id = ?",
            )
            .bind(&tx_country)
            .bind(&tx_country)
            .execute(&mut **tx)
            .await?;
            Ok(())
        }
        .boxed()
    })
    .await
    .map_err(|e| ctx(e, "delete").with_context("id", id.to_string()))
}

/// Flip a country's offering on or off for the storefront. The stored row is
/// created on demand (with default fees) so there is always a record to
/// project; the flag itself lives only on the returned view.
pub async fn toggle_status(
    pool: &SqlitePool,
    country_id: &str,
    active: bool,
) -> AppResult<VisaPackageView> {
    if country_id.trim().is_empty() {
        return Err(AppError::new(
            "VISA_PACKAGE/COUNTRY_REQUIRED",
            "country_id is required for visa packages",
        ));
    }
    if !country_exists(pool, country_id).await? {
        return Err(AppError::new("COUNTRY/NOT_FOUND", "Country not found")
            .with_context("country_id", country_id.to_string()));
    }

    let existing = sqlx::query("SELECT * FROM visa_packages WHERE country_id = ? ORDER BY created_at ASC LIMIT 1")
        .bind(country_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            ctx(AppError::from(e), "toggle_status")
                .with_context("country_id", country_id.to_string())
        })?;

    let package = match existing.as_ref() {
        Some(row) => VisaPackage::try_from(row)?,
        None => {
            let input = VisaPackageInput {
                country_id: country_id.to_string(),
                name: Some(DEFAULT_PACKAGE_NAME.to_string()),
                government_fee: Some(DEFAULT_GOVERNMENT_FEE),
                service_fee: Some(DEFAULT_SERVICE_FEE),
                processing_days: Some(DEFAULT_PROCESSING_DAYS),
                ..Default::default()
            };
            save(pool, &input).await?
        }
    };

    Ok(VisaPackageView {
        package,
        is_active: active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_defaults_to_fee_sum() {
        let input = VisaPackageInput {
            country_id: "c1".into(),
            government_fee: Some(4500),
            service_fee: Some(1500),
            ..Default::default()
        };
        assert_eq!(resolve_fees(&input), (4500, 1500, 6000));
    }

    #[test]
    fn explicit_total_wins() {
        let input = VisaPackageInput {
            country_id: "c1".into(),
            government_fee: Some(100),
            service_fee: Some(100),
            total_price: Some(150),
            ..Default::default()
        };
        assert_eq!(resolve_fees(&input).2, 150);
    }

    #[test]
    fn missing_fees_default_to_zero() {
        let input = VisaPackageInput {
            country_id: "c1".into(),
            ..Default::default()
        };
        assert_eq!(resolve_fees(&input), (0, 0, 0));
    }
}
