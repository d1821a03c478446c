mod app;
mod calendar;
mod client;
mod config;
mod error;
mod forms;
mod metrics;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_tracing(&config)?;

    tracing::info!(base_url = %config.base_url, "starting propdesk tui");
    let mut app = app::App::new(config)?;
    app.run().await?;
    Ok(())
}

/// Logs go to a file, never to the terminal: the alternate screen owns
/// stdout. With no `log_file` configured, logging stays off.
fn init_tracing(config: &config::AppConfig) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("propdesk_tui={}", config.log_level))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();
    Ok(())
}
