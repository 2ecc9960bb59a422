use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum GuardError {
    /// The live schema is missing expected tables or columns.
    #[error("{0}")]
    Drift(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Expected shape of every domain table. The guard compares this against the
/// live database after migrations and refuses to serve on any drift; schema
/// changes happen only through the migration pipeline.
const EXPECTED: &[(&str, &[&str])] = &[
    (
        "countries",
        &[
            "id",
            "name",
            "flag_url",
            "banner_url",
            "description",
            "entry_type",
            "validity",
            "length_of_stay",
            "visa_includes",
            "embassy_details",
            "processing_steps",
            "faq",
            "popularity",
            "min_price",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "visa_packages",
        &[
            "id",
            "country_id",
            "name",
            "government_fee",
            "service_fee",
            "processing_days",
            "total_price",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "legal_pages",
        &["id", "title", "slug", "content", "created_at", "updated_at"],
    ),
    (
        "testimonials",
        &[
            "id",
            "client_name",
            "country",
            "visa_type",
            "rating",
            "comment",
            "avatar_url",
            "approved",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "approved_visas",
        &[
            "id",
            "country",
            "visa_type",
            "image_url",
            "approval_date",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "addon_services",
        &[
            "id",
            "name",
            "price",
            "discount_percentage",
            "delivery_days",
            "description",
            "image_url",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "blogs",
        &[
            "id",
            "title",
            "slug",
            "content",
            "excerpt",
            "featured_image",
            "published_at",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "document_checklist_items",
        &[
            "id",
            "country_id",
            "document_name",
            "document_description",
            "required",
            "created_at",
            "updated_at",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaReport {
    pub missing_tables: Vec<String>,
    pub missing_columns: Vec<MissingColumn>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.missing_tables.is_empty() && self.missing_columns.is_empty()
    }
}

pub fn format_guard_failure(report: &SchemaReport) -> String {
    let mut parts = Vec::new();
    if !report.missing_tables.is_empty() {
        parts.push(format!(
            "missing tables: {}",
            report.missing_tables.join(", ")
        ));
    }
    if !report.missing_columns.is_empty() {
        let cols: Vec<String> = report
            .missing_columns
            .iter()
            .map(|m| format!("{}.{}", m.table, m.column))
            .collect();
        parts.push(format!("missing columns: {}", cols.join(", ")));
    }
    format!(
        "Schema drift detected ({}). Run `migrate up` before starting the server.",
        parts.join("; ")
    )
}

async fn table_columns(
    pool: &SqlitePool,
    table: &str,
) -> Result<Option<HashSet<String>>, GuardError> {
    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?")
            .bind(table)
            .fetch_optional(pool)
            .await?;
    if exists.is_none() {
        return Ok(None);
    }
    let rows = sqlx::query(&format!("PRAGMA table_info('{table}');"))
        .fetch_all(pool)
        .await?;
    let mut names = HashSet::new();
    for row in rows {
        if let Ok(name) = row.try_get::<String, _>("name") {
            names.insert(name);
        }
    }
    Ok(Some(names))
}

/// Inspect every expected table and report all drift at once; the caller
/// decides whether to abort. Never issues DDL.
pub async fn check(pool: &SqlitePool) -> Result<SchemaReport, GuardError> {
    let mut report = SchemaReport::default();
    for (table, columns) in EXPECTED {
        match table_columns(pool, table).await? {
            None => report.missing_tables.push((*table).to_string()),
            Some(present) => {
                for column in *columns {
                    if !present.contains(*column) {
                        report.missing_columns.push(MissingColumn {
                            table: (*table).to_string(),
                            column: (*column).to_string(),
                        });
                    }
                }
            }
        }
    }
    info!(
        target: "permitsy",
        event = "schema_guard_check",
        missing_tables = report.missing_tables.len(),
        missing_columns = report.missing_columns.len()
    );
    Ok(report)
}

/// Fail fast on drift: the server refuses to start rather than patching the
/// schema at runtime.
pub async fn enforce(pool: &SqlitePool) -> Result<(), GuardError> {
    let report = check(pool).await?;
    if report.is_ok() {
        return Ok(());
    }
    let message = format_guard_failure(&report);
    error!(target: "permitsy", event = "schema_guard_failed", detail = %message);
    Err(GuardError::Drift(message))
}
