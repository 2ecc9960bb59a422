use anyhow::Result;
use permitsy_lib::seed;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn legal_pages_seed_twice_leaves_four_rows() -> Result<()> {
    let pool = util::memory_pool().await;

    seed::seed_legal_pages(&pool).await?;
    seed::seed_legal_pages(&pool).await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM legal_pages")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 4, "slug upsert must not duplicate rows");

    let slugs: Vec<String> = sqlx::query_scalar("SELECT slug FROM legal_pages ORDER BY slug")
        .fetch_all(&pool)
        .await?;
    assert_eq!(
        slugs,
        vec![
            "cookie-policy",
            "privacy-policy",
            "refund-policy",
            "terms-of-service"
        ]
    );
    Ok(())
}

#[tokio::test]
async fn full_seed_is_idempotent_across_sections() -> Result<()> {
    let pool = util::memory_pool().await;

    seed::seed_all(&pool).await?;
    let counts_first = table_counts(&pool).await?;
    seed::seed_all(&pool).await?;
    let counts_second = table_counts(&pool).await?;

    assert_eq!(counts_first, counts_second, "re-seeding must not grow tables");
    assert_eq!(counts_first.0, 3, "three starter countries");
    assert_eq!(counts_first.1, 3, "one package per starter country");
    assert_eq!(counts_first.2, 3, "three testimonials");
    Ok(())
}

#[tokio::test]
async fn seeded_countries_carry_min_price() -> Result<()> {
    let pool = util::memory_pool().await;
    seed::seed_all(&pool).await?;

    let zero_priced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM countries WHERE min_price <= 0")
            .fetch_one(&pool)
            .await?;
    assert_eq!(zero_priced, 0, "every seeded country has a priced package");
    Ok(())
}

async fn table_counts(pool: &sqlx::SqlitePool) -> Result<(i64, i64, i64, i64, i64)> {
    let countries: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
        .fetch_one(pool)
        .await?;
    let packages: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM visa_packages")
        .fetch_one(pool)
        .await?;
    let testimonials: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM testimonials")
        .fetch_one(pool)
        .await?;
    let blogs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blogs")
        .fetch_one(pool)
        .await?;
    let addons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addon_services")
        .fetch_one(pool)
        .await?;
    Ok((countries, packages, testimonials, blogs, addons))
}
