use anyhow::Result;
use permitsy_lib::schema_guard::{self, format_guard_failure};

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn fresh_database_passes_the_guard() -> Result<()> {
    let pool = util::memory_pool().await;
    let report = schema_guard::check(&pool).await?;
    assert!(report.is_ok());
    schema_guard::enforce(&pool).await?;
    Ok(())
}

#[tokio::test]
async fn drift_in_two_tables_is_reported_in_one_pass() -> Result<()> {
    let pool = util::memory_pool().await;
    sqlx::query("ALTER TABLE visa_packages DROP COLUMN service_fee")
        .execute(&pool)
        .await?;
    sqlx::query("ALTER TABLE blogs DROP COLUMN excerpt")
        .execute(&pool)
        .await?;

    let report = schema_guard::check(&pool).await?;
    assert!(!report.is_ok());
    let missing: Vec<String> = report
        .missing_columns
        .iter()
        .map(|m| format!("{}.{}", m.table, m.column))
        .collect();
    assert!(missing.contains(&"visa_packages.service_fee".to_string()));
    assert!(missing.contains(&"blogs.excerpt".to_string()));

    let message = format_guard_failure(&report);
    assert!(message.contains("visa_packages.service_fee"));
    assert!(message.contains("blogs.excerpt"));
    assert!(message.contains("migrate up"), "remedy must be named");
    Ok(())
}

#[tokio::test]
async fn enforce_fails_fast_on_drift() -> Result<()> {
    let pool = util::memory_pool().await;
    sqlx::query("DROP TABLE addon_services").execute(&pool).await?;

    let err = schema_guard::enforce(&pool)
        .await
        .expect_err("missing table must abort startup");
    assert!(err.to_string().contains("addon_services"));
    Ok(())
}

#[tokio::test]
async fn missing_table_lists_the_table_not_its_columns() -> Result<()> {
    let pool = util::memory_pool().await;
    sqlx::query("DROP TABLE approved_visas").execute(&pool).await?;

    let report = schema_guard::check(&pool).await?;
    assert_eq!(report.missing_tables, vec!["approved_visas".to_string()]);
    assert!(report
        .missing_columns
        .iter()
        .all(|m| m.table != "approved_visas"));
    Ok(())
}
