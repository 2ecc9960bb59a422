use std::collections::HashSet;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use ts_rs::TS;

use crate::{db::run_in_tx, id::new_uuid_v7, time::now_ms, AppError, AppResult};

/// One row of a country's required-documents checklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct DocumentChecklistItem {
    pub id: String,
    pub country_id: String,
    pub document_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub document_description: Option<String>,
    pub required: bool,
    #[ts(type = "number")]
    pub created_at: i64,
    #[ts(type = "number")]
    pub updated_at: i64,
}

impl TryFrom<&SqliteRow> for DocumentChecklistItem {
    type Error = AppError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id").map_err(AppError::from)?,
            country_id: row.try_get("country_id").map_err(AppError::from)?,
            document_name: row.try_get("document_name").map_err(AppError::from)?,
            document_description: row
                .try_get("document_description")
                .map_err(AppError::from)?,
            required: row
                .try_get::<i64, _>("required")
                .map(|value| value != 0)
                .map_err(AppError::from)?,
            created_at: row.try_get("created_at").map_err(AppError::from)?,
            updated_at: row.try_get("updated_at").map_err(AppError::from)?,
        })
    }
}

/// Desired state of one checklist row. Items with an id update the matching
/// row; items without one are created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChecklistItemInput {
    #[serde(default)]
    #[ts(optional)]
    pub id: Option<String>,
    pub document_name: String,
    #[serde(default)]
    #[ts(optional)]
    pub document_description: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct ReconcileOutcome {
    #[ts(type = "number")]
    pub created: i64,
    #[ts(type = "number")]
    pub updated: i64,
    #[ts(type = "number")]
    pub deleted: i64,
}

fn ctx(err: AppError, operation: &str) -> AppError {
    err.with_context("operation", operation.to_string())
        .with_context("table", "document_checklist_items".to_string())
}

pub async fn list_for_country(
    pool: &SqlitePool,
    country_id: &str,
) -> AppResult<Vec<DocumentChecklistItem>> {
    let rows = sqlx::query(
        "SELECT * FROM document_checklist_items WHERE country_id = ? ORDER BY document_name",
    )
    .bind(country_id)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        ctx(AppError::from(e), "list_for_country").with_context("country_id", country_id.to_string())
    })?;
    rows.iter().map(DocumentChecklistItem::try_from).collect()
}

fn validate(desired: &[ChecklistItemInput]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for item in desired {
        if item.document_name.trim().is_empty() {
            return Err(AppError::new(
                "CHECKLIST/NAME_REQUIRED",
                "document_name is required",
            ));
        }
        if !seen.insert(item.document_name.trim().to_ascii_lowercase()) {
            return Err(AppError::new(
                "CHECKLIST/DUPLICATE_NAME",
                "Checklist contains a duplicate document name",
            )
            .with_context("document_name", item.document_name.clone()));
        }
    }
    Ok(())
}

/// Replace a country's checklist with the desired set in one transaction:
/// rows with a matching id are updated, new rows are inserted, and stored
/// rows absent from the desired set are deleted. A failure anywhere rolls
/// back the whole batch.
pub async fn reconcile(
    pool: &SqlitePool,
    country_id: &str,
    desired: &[ChecklistItemInput],
) -> AppResult<ReconcileOutcome> {
    validate(desired)?;

    let existing = list_for_country(pool, country_id).await?;
    let desired = desired.to_vec();
    let country_id_owned = country_id.to_string();

    let outcome = run_in_tx::<_, AppError, _>(pool, move |tx| {
        async move {
            let mut outcome = ReconcileOutcome::default();
            let now = now_ms();
            let mut keep: HashSet<String> = HashSet::new();

            for item in &desired {
                match item.id.as_deref() {
                    Some(id) if existing.iter().any(|e| e.id == id) => {
                        sqlx::query(
                            "UPDATE document_checklist_items SET \
                               document_name = ?, document_description = ?, required = ?, \
                               updated_at = ? \
                             WHERE id = ? AND country_id = ?",
                        )
                        .bind(&item.document_name)
                        .bind(&item.document_description)
                        .bind(item.required as i64)
                        .bind(now)
                        .bind(id)
                        .bind(&country_id_owned)
                        .execute(&mut **tx)
                        .await?;
                        keep.insert(id.to_string());
                        outcome.updated += 1;
                    }
                    _ => {
                        let id = new_uuid_v7();
                        sqlx::query(
                            "INSERT INTO document_checklist_items \
                               (id, country_id, document_name, document_description, required, \
                                created_at, updated_at) \
                             VALUES (?, ?, ?, ?, ?, ?, ?)",
                        )
                        .bind(&id)
                        .bind(&country_id_owned)
                        .bind(&item.document_name)
                        .bind(&item.document_description)
                        .bind(item.required as i64)
                        .bind(now)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                        keep.insert(id);
                        outcome.created += 1;
                    }
                }
            }

            for stale in existing.iter().filter(|e| !keep.contains(&e.id)) {
                sqlx::query("DELETE FROM document_checklist_items WHERE id = ?")
                    .bind(&stale.id)
                    .execute(&mut **tx)
                    .await?;
                outcome.deleted += 1;
            }

            Ok(outcome)
        }
        .boxed()
    })
    .await
    .map_err(|e: AppError| ctx(e, "reconcile").with_context("country_id", country_id.to_string()))?;

    tracing::info!(
        target = "permitsy",
        event = "checklist_reconciled",
        country_id = %country_id,
        created = outcome.created,
        updated = outcome.updated,
        deleted = outcome.deleted
    );
    Ok(outcome)
}
