// Coaching dashboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Load the match dataset with the configured column map
// 4. Build the LLM client
// 5. Create mpsc channels
// 6. Spawn the app orchestrator task
// 7. Run the TUI event loop (blocking until the user quits)
// 8. Cleanup on exit

use std::path::Path;

use dropzone_coach::app;
use dropzone_coach::config;
use dropzone_coach::dataset;
use dropzone_coach::llm;
use dropzone_coach::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not the terminal the TUI owns)
    init_tracing()?;
    info!("Coaching dashboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: dataset={}, schema={}, model={}",
        config.dataset.path, config.dataset.schema, config.llm.model
    );

    // 3. Load the match dataset
    let column_map = config
        .dataset
        .column_map()
        .context("failed to resolve column map")?;
    let dataset = dataset::load_dataset(
        Path::new(&config.dataset.path),
        &column_map,
        config.dataset.player_column.as_deref(),
    )
    .context("failed to load match dataset")?;
    info!(
        "Loaded {} rows across {} players",
        dataset.row_count(),
        dataset.players.len()
    );
    if !dataset.missing_columns.is_empty() {
        info!(
            "Columns absent from dataset (fields default to 0): {}",
            dataset.missing_columns.join(", ")
        );
    }

    // 4. Build the LLM client from config
    let llm_client = llm::client::LlmClient::from_config(&config);
    match &llm_client {
        llm::client::LlmClient::Active(_) => info!("LLM client initialized (API key configured)"),
        llm::client::LlmClient::Disabled => info!("LLM client disabled (no API key)"),
    }

    // 5. Create mpsc channels
    let (llm_tx, llm_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, dataset, llm_client, llm_tx);

    // 6. Spawn the app orchestrator task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(llm_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. Run the TUI event loop (blocking until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Coaching dashboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by
/// the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("dropcoach.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dropzone_coach=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
