use std::net::SocketAddr;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use permitsy_lib::{
    config::Config, db, http, logging, migrate, schema_guard, seed, state::AppState,
};

#[derive(Debug, Parser)]
#[command(name = "permitsy", about = "Permitsy visa site server", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run migrations and serve the API and SPA bundle (the default).
    Serve,
    /// Print migration and schema status as JSON and exit.
    Status,
    /// Apply migrations and install reference data, then exit.
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load();
    // The guard flushes the file sink on drop; hold it for the process
    // lifetime.
    let _log_guard = match config.log_dir.as_deref() {
        Some(dir) => Some(logging::init_with_file(dir)?),
        None => {
            logging::init();
            None
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Status => status(config).await,
        Commands::Seed => seed_cmd(config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let pool = db::open_pool(&config.db_path).await?;
    migrate::apply_migrations(&pool)
        .await
        .context("apply migrations")?;
    // Refuse to serve a drifted schema rather than patch it at runtime.
    schema_guard::enforce(&pool).await?;

    let state = AppState::new(pool);
    let app = http::router(state, &config.static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        target = "permitsy",
        event = "server_listening",
        addr = %addr,
        static_dir = %config.static_dir.display()
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    tracing::info!(target = "permitsy", event = "server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut signal) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            signal.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!(target = "permitsy", event = "shutdown_signal");
}

async fn status(config: Config) -> Result<()> {
    let pool = db::open_pool(&config.db_path).await?;
    let applied = migrate::applied_versions(&pool).await?;
    let report = schema_guard::check(&pool).await?;
    let payload = json!({
        "db_path": config.db_path.display().to_string(),
        "migrations_total": migrate::MIGRATIONS.len(),
        "migrations_applied": applied.len(),
        "schema_ok": report.is_ok(),
        "missing_tables": report.missing_tables,
        "missing_columns": report
            .missing_columns
            .iter()
            .map(|m| format!("{}.{}", m.table, m.column))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    if !report.is_ok() {
        process::exit(1);
    }
    Ok(())
}

async fn seed_cmd(config: Config) -> Result<()> {
    let pool = db::open_pool(&config.db_path).await?;
    migrate::apply_migrations(&pool)
        .await
        .context("apply migrations")?;
    schema_guard::enforce(&pool).await?;
    seed::seed_all(&pool).await.map_err(anyhow::Error::from)?;
    println!("seed complete");
    Ok(())
}
