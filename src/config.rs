use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub const LOG_FILTER_ENV: &str = "PERMITSY_LOG";
pub const DEFAULT_LOG_FILTER: &str = "permitsy=info,permitsy_lib=info,sqlx=warn,tower_http=info";

/// Runtime configuration, read once from the environment at startup and
/// passed down explicitly. Nothing else in the crate reads env vars or
/// embeds paths.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub port: u16,
    pub static_dir: PathBuf,
    /// When set, logs are tee'd to daily-rotated files in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            db_path: var("PERMITSY_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_db_path()),
            port: try_load("PERMITSY_PORT", "8080"),
            static_dir: var("PERMITSY_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("dist")),
            log_dir: var("PERMITSY_LOG_DIR").map(PathBuf::from).ok(),
        }
    }
}

pub fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("permitsy").join("permitsy.sqlite3")
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_db_path_ends_with_app_file() {
        let p = default_db_path();
        assert!(p.ends_with("permitsy/permitsy.sqlite3"));
    }
}
