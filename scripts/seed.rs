#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use permitsy_lib::{config, db, logging, migrate, schema_guard, seed};

#[derive(Parser)]
#[command(name = "seed", about = "Install Permitsy reference data (idempotent)")]
struct Cli {
    /// Optional explicit DB path
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Seed a single section instead of everything
    #[arg(long, value_enum)]
    only: Option<Section>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Section {
    LegalPages,
    Countries,
    Testimonials,
    AddonServices,
    Blogs,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or_else(config::default_db_path);
    let pool = db::open_pool(&db_path).await?;
    migrate::apply_migrations(&pool).await?;
    schema_guard::enforce(&pool).await?;

    match cli.only {
        None => {
            seed::seed_all(&pool).await?;
            println!("seeded all sections");
        }
        Some(Section::LegalPages) => {
            let n = seed::seed_legal_pages(&pool).await?;
            println!("seeded {n} legal pages");
        }
        Some(Section::Countries) => {
            let n = seed::seed_countries(&pool).await?;
            println!("seeded {n} countries");
        }
        Some(Section::Testimonials) => {
            let n = seed::seed_testimonials(&pool).await?;
            println!("seeded {n} testimonials");
        }
        Some(Section::AddonServices) => {
            let n = seed::seed_addon_services(&pool).await?;
            println!("seeded {n} addon services");
        }
        Some(Section::Blogs) => {
            let n = seed::seed_blogs(&pool).await?;
            println!("seeded {n} blog posts");
        }
    }
    Ok(())
}
