#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

use permitsy_lib::{config, db, logging, migrate, schema_guard};

#[derive(Parser)]
#[command(name = "migrate", about = "Permitsy migration helper")]
struct Cli {
    /// Optional explicit DB path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// List migrations and show applied/pending
    #[command(about, long_about = None)]
    List,
    /// Show current migration status
    #[command(about, long_about = None)]
    Status,
    /// Apply pending migrations
    #[command(about, long_about = None)]
    Up,
    /// Check schema shape without applying anything
    #[command(about, long_about = None)]
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(config::default_db_path);
    let pool = db::open_pool(&db_path).await?;

    match cli.cmd {
        Cmd::List => {
            let applied = migrate::applied_versions(&pool).await?;
            for (name, _) in migrate::MIGRATIONS {
                let mark = if applied.contains_key(*name) {
                    "applied"
                } else {
                    "pending"
                };
                println!("{mark:8} {name}");
            }
            Ok(())
        }
        Cmd::Status => {
            let applied = migrate::applied_versions(&pool).await?;
            let pending = migrate::MIGRATIONS
                .iter()
                .filter(|(name, _)| !applied.contains_key(*name))
                .count();
            println!(
                "{} applied, {} pending ({})",
                applied.len(),
                pending,
                db_path.display()
            );
            Ok(())
        }
        Cmd::Up => {
            migrate::apply_migrations(&pool).await?;
            println!("migrations up to date");
            Ok(())
        }
        Cmd::Check => {
            let report = schema_guard::check(&pool).await?;
            if report.is_ok() {
                println!("schema OK");
                Ok(())
            } else {
                eprintln!("{}", schema_guard::format_guard_failure(&report));
                process::exit(1);
            }
        }
    }
}
