#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Result};
use clap::Parser;

use permitsy_lib::{config, db, schema_guard};

#[derive(Parser)]
#[command(name = "verify_schema", about = "Verify the database matches the expected shape")]
struct Args {
    /// Optional explicit DB path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let db_path = args.db.unwrap_or_else(config::default_db_path);
    if !db_path.exists() {
        return Err(anyhow!(
            "database not found at {} (run migrations first)",
            db_path.display()
        ));
    }
    let pool = db::open_pool(&db_path).await?;

    let report = schema_guard::check(&pool).await?;
    if report.is_ok() {
        println!("schema OK");
        return Ok(());
    }
    eprintln!("{}", schema_guard::format_guard_failure(&report));
    process::exit(1);
}
