#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use permitsy_lib::countries::{self, CountryInput};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    sqlx::query("PRAGMA foreign_keys=ON;")
        .execute(&pool)
        .await
        .unwrap();
    permitsy_lib::migrate::apply_migrations(&pool)
        .await
        .expect("apply migrations");
    pool
}

pub async fn insert_country(pool: &SqlitePool, name: &str) -> String {
    let input = CountryInput {
        name: name.to_string(),
        ..Default::default()
    };
    countries::create(pool, &input)
        .await
        .expect("create country")
        .id
}
