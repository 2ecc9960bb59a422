use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Column, Row, SqlitePool, TypeInfo, ValueRef};

use crate::{AppError, AppResult};

pub const DOMAIN_TABLES: &[&str] = &[
    "countries",
    "visa_packages",
    "legal_pages",
    "testimonials",
    "approved_visas",
    "addon_services",
    "blogs",
    "document_checklist_items",
];

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier pattern"));

static ORDER_BY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*( (?i:ASC|DESC))?$").expect("order-by pattern")
});

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern"));

/// Slugs are external lookup keys; keep them URL-shaped.
pub fn ensure_slug(slug: &str) -> AppResult<()> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(AppError::new("SLUG/INVALID", "Slug must be lowercase [a-z0-9-]+")
            .with_context("slug", slug.to_string()))
    }
}

pub fn ensure_table(table: &str) -> AppResult<()> {
    if DOMAIN_TABLES.contains(&table) {
        Ok(())
    } else {
        Err(AppError::new("CRUD/INVALID_TABLE", "Unknown table")
            .with_context("table", table.to_string()))
    }
}

/// Payload keys become SQL column names; reject anything that is not a plain
/// identifier before it gets near a query string.
pub fn ensure_column(column: &str) -> AppResult<()> {
    if IDENT_RE.is_match(column) {
        Ok(())
    } else {
        Err(AppError::new("CRUD/INVALID_COLUMN", "Invalid column name")
            .with_context("column", column.to_string()))
    }
}

fn ensure_order_by(order_by: &str) -> AppResult<()> {
    if ORDER_BY_RE.is_match(order_by) {
        Ok(())
    } else {
        Err(AppError::new("CRUD/INVALID_ORDER_BY", "Invalid order_by clause")
            .with_context("order_by", order_by.to_string()))
    }
}

pub async fn list_rows(
    pool: &SqlitePool,
    table: &str,
    order_by: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> AppResult<Vec<SqliteRow>> {
    ensure_table(table)?;
    let mut sql = format!("SELECT * FROM {table}");
    if let Some(order) = order_by {
        ensure_order_by(order)?;
        sql.push_str(&format!(" ORDER BY {order}"));
    }
    if let Some(n) = limit {
        sql.push_str(&format!(" LIMIT {n}"));
        if let Some(o) = offset {
            sql.push_str(&format!(" OFFSET {o}"));
        }
    }
    sqlx::query(&sql)
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn get_row(pool: &SqlitePool, table: &str, id: &str) -> AppResult<Option<SqliteRow>> {
    ensure_table(table)?;
    let sql = format!("SELECT * FROM {table} WHERE id = ?");
    sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

/// Decode a dynamic row into JSON, keeping SQLite's loose typing intact.
pub fn row_to_json(row: SqliteRow) -> Value {
    let mut map = Map::new();
    for col in row.columns() {
        let idx = col.ordinal();
        let v = row.try_get_raw(idx).ok();
        let val = match v {
            Some(raw) => {
                if raw.is_null() {
                    Value::Null
                } else {
                    match raw.type_info().name() {
                        "INTEGER" => row
                            .try_get::<i64, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                        "REAL" => row
                            .try_get::<f64, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                        _ => row
                            .try_get::<String, _>(idx)
                            .map(Value::from)
                            .unwrap_or(Value::Null),
                    }
                }
            }
            None => Value::Null,
        };
        map.insert(col.name().to_string(), val);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_table() {
        let err = ensure_table("users; DROP TABLE countries").unwrap_err();
        assert_eq!(err.code(), "CRUD/INVALID_TABLE");
        assert!(ensure_table("legal_pages").is_ok());
    }

    #[test]
    fn rejects_hostile_order_by() {
        assert!(ensure_order_by("popularity DESC").is_ok());
        assert!(ensure_order_by("name").is_ok());
        assert!(ensure_order_by("name; DROP TABLE blogs").is_err());
    }

    #[test]
    fn rejects_hostile_column() {
        assert!(ensure_column("government_fee").is_ok());
        assert!(ensure_column("fee, updated_at = 0").is_err());
    }

    #[test]
    fn slug_shape() {
        assert!(ensure_slug("privacy-policy").is_ok());
        assert!(ensure_slug("Privacy Policy").is_err());
        assert!(ensure_slug("").is_err());
    }
}
