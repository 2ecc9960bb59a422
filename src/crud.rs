//! The single generic write path for admin mutations. Table names come from
//! the `repo` allowlist, payloads are JSON objects, and every operation
//! stamps audit columns and emits one structured log event.

use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::info;

use crate::{id::new_uuid_v7, repo, time::now_ms, AppError, AppResult};

fn bind_value<'q>(
    q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    v: &Value,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match v {
        Value::Null => q.bind(Option::<i64>::None),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(Option::<i64>::None)
            }
        }
        Value::Bool(b) => q.bind(*b as i64),
        Value::String(s) => q.bind(s.clone()),
        // Arrays/objects are stored as JSON text.
        _ => q.bind(v.to_string()),
    }
}

fn ensure_payload_columns(data: &Map<String, Value>) -> AppResult<()> {
    for key in data.keys() {
        repo::ensure_column(key)?;
    }
    Ok(())
}

pub async fn create(
    pool: &SqlitePool,
    table: &str,
    mut data: Map<String, Value>,
) -> AppResult<Value> {
    repo::ensure_table(table)?;
    ensure_payload_columns(&data)?;

    let id = data
        .get("id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(new_uuid_v7);
    data.insert("id".into(), Value::String(id.clone()));
    let now = now_ms();
    data.entry(String::from("created_at"))
        .or_insert(Value::from(now));
    data.insert("updated_at".into(), Value::from(now));

    let cols: Vec<String> = data.keys().cloned().collect();
    let placeholders: Vec<String> = cols.iter().map(|_| "?".into()).collect();
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        cols.join(","),
        placeholders.join(",")
    );
    let mut query = sqlx::query(&sql);
    for c in &cols {
        let value = data.get(c).ok_or_else(|| {
            AppError::new("CRUD/MISSING_FIELD", "Payload missing value for column")
                .with_context("column", c.clone())
        })?;
        query = bind_value(query, value);
    }
    query.execute(pool).await.map_err(|e| {
        AppError::from(e)
            .with_context("operation", "create")
            .with_context("table", table.to_string())
    })?;

    info!(target = "permitsy", event = "crud_create", table = %table, id = %id);
    Ok(Value::Object(data))
}

pub async fn update(
    pool: &SqlitePool,
    table: &str,
    id: &str,
    mut data: Map<String, Value>,
) -> AppResult<Value> {
    repo::ensure_table(table)?;
    data.remove("id");
    data.remove("created_at");
    ensure_payload_columns(&data)?;
    if data.is_empty() {
        return Err(AppError::new("CRUD/EMPTY_PAYLOAD", "Nothing to update")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string()));
    }
    data.insert("updated_at".into(), Value::from(now_ms()));

    let cols: Vec<String> = data.keys().cloned().collect();
    let set_clause: Vec<String> = cols.iter().map(|c| format!("{c} = ?")).collect();
    let sql = format!("UPDATE {table} SET {} WHERE id = ?", set_clause.join(","));
    let mut query = sqlx::query(&sql);
    for c in &cols {
        let value = data.get(c).ok_or_else(|| {
            AppError::new("CRUD/MISSING_FIELD", "Payload missing value for column")
                .with_context("column", c.clone())
        })?;
        query = bind_value(query, value);
    }
    let res = query.bind(id).execute(pool).await.map_err(|e| {
        AppError::from(e)
            .with_context("operation", "update")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string())
    })?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("CRUD/NOT_FOUND", "Record not found")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string()));
    }

    info!(target = "permitsy", event = "crud_update", table = %table, id = %id);
    let row = repo::get_row(pool, table, id).await?;
    row.map(repo::row_to_json).ok_or_else(|| {
        AppError::new("CRUD/NOT_FOUND", "Record not found after update")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string())
    })
}

pub async fn delete(pool: &SqlitePool, table: &str, id: &str) -> AppResult<()> {
    repo::ensure_table(table)?;
    let sql = format!("DELETE FROM {table} WHERE id = ?");
    let res = sqlx::query(&sql).bind(id).execute(pool).await.map_err(|e| {
        AppError::from(e)
            .with_context("operation", "delete")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string())
    })?;
    if res.rows_affected() == 0 {
        return Err(AppError::new("CRUD/NOT_FOUND", "Record not found")
            .with_context("table", table.to_string())
            .with_context("id", id.to_string()));
    }
    info!(target = "permitsy", event = "crud_delete", table = %table, id = %id);
    Ok(())
}
