use anyhow::Result;
use permitsy_lib::countries;
use permitsy_lib::visa_packages::{self, VisaPackageInput, DEFAULT_PACKAGE_NAME};
use sqlx::Row;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn save_without_country_is_rejected_before_any_write() -> Result<()> {
    let pool = util::memory_pool().await;
    let err = visa_packages::save(
        &pool,
        &VisaPackageInput {
            government_fee: Some(100),
            service_fee: Some(50),
            ..Default::default()
        },
    )
    .await
    .expect_err("missing country_id should fail");
    assert_eq!(err.code(), "VISA_PACKAGE/COUNTRY_REQUIRED");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visa_packages")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 0, "validation must short-circuit before the insert");
    Ok(())
}

#[tokio::test]
async fn save_computes_total_from_fees() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Japan").await;

    let saved = visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            name: Some("eVisa".into()),
            government_fee: Some(3000),
            service_fee: Some(1900),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(saved.total_price, 4900);
    assert_eq!(saved.government_fee, 3000);
    assert_eq!(saved.service_fee, 1900);
    Ok(())
}

#[tokio::test]
async fn save_upserts_by_id_and_refreshes_min_price() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Japan").await;

    let first = visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            name: Some("Express".into()),
            government_fee: Some(8000),
            service_fee: Some(4000),
            ..Default::default()
        },
    )
    .await?;
    visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            name: Some("Budget".into()),
            government_fee: Some(2000),
            service_fee: Some(1000),
            ..Default::default()
        },
    )
    .await?;

    let country = countries::get(&pool, &country_id).await?.expect("country");
    assert_eq!(country.min_price, 3000, "cheapest package wins");

    // Re-saving the expensive package cheaper keeps the same row and lowers
    // the cached minimum again.
    let updated = visa_packages::save(
        &pool,
        &VisaPackageInput {
            id: Some(first.id.clone()),
            country_id: country_id.clone(),
            name: Some("Express".into()),
            government_fee: Some(1000),
            service_fee: Some(500),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(updated.id, first.id);
    assert_eq!(
        visa_packages::list_for_country(&pool, &country_id).await?.len(),
        2
    );
    let country = countries::get(&pool, &country_id).await?.expect("country");
    assert_eq!(country.min_price, 1500);
    Ok(())
}

#[tokio::test]
async fn save_for_unknown_country_is_not_found() -> Result<()> {
    let pool = util::memory_pool().await;
    let err = visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: "no-such-country".into(),
            government_fee: Some(100),
            ..Default::default()
        },
    )
    .await
    .expect_err("unknown country should fail");
    assert_eq!(err.code(), "COUNTRY/NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn toggle_creates_default_package_and_flags_the_view() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Brazil").await;

    let view = visa_packages::toggle_status(&pool, &country_id, true).await?;
    assert!(view.is_active);
    assert_eq!(view.package.name, DEFAULT_PACKAGE_NAME);
    assert_eq!(view.package.country_id, country_id);

    // The flag is a projection: the stored row has no such column.
    let row = sqlx::query("SELECT * FROM visa_packages WHERE id = ?")
        .bind(&view.package.id)
        .fetch_one(&pool)
        .await?;
    assert!(
        row.try_get::<i64, _>("is_active").is_err(),
        "is_active must not be persisted"
    );

    // Toggling again reuses the stored package rather than creating another.
    let second = visa_packages::toggle_status(&pool, &country_id, false).await?;
    assert!(!second.is_active);
    assert_eq!(second.package.id, view.package.id);
    assert_eq!(
        visa_packages::list_for_country(&pool, &country_id).await?.len(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn delete_refreshes_min_price() -> Result<()> {
    let pool = util::memory_pool().await;
    let country_id = util::insert_country(&pool, "Japan").await;

    let cheap = visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            name: Some("Budget".into()),
            government_fee: Some(1000),
            service_fee: Some(500),
            ..Default::default()
        },
    )
    .await?;
    visa_packages::save(
        &pool,
        &VisaPackageInput {
            country_id: country_id.clone(),
            name: Some("Express".into()),
            government_fee: Some(5000),
            service_fee: Some(2000),
            ..Default::default()
        },
    )
    .await?;

    visa_packages::delete(&pool, &cheap.id).await?;
    let country = countries::get(&pool, &country_id).await?.expect("country");
    assert_eq!(country.min_price, 7000);

    visa_packages::delete(&pool, &cheap.id)
        .await
        .expect_err("double delete should fail");
    Ok(())
}
