use anyhow::{anyhow, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub fn enable_logging(log_level: Option<LevelFilter>) -> Result<()> {
    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter_directive(&level))?)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// A bare level applies to this crate only. Anything else is taken as a full
/// filter expression.
fn filter_directive(level: &str) -> String {
    match level.trim().parse::<LevelFilter>() {
        Ok(level) => format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level.to_string().to_lowercase()
        ),
        Err(_) => level.to_string(),
    }
}
