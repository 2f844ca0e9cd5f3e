use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use workshop_cleaner::app::{self, confirm::PromptConfirmation, events::UserEvent, state::AppState};
use workshop_cleaner::config::AppConfig;
use workshop_cleaner::core::{Backend, FsBackend};

/// Headless host: one IPC message per line on stdin, one event per line on
/// stdout. Logs go to stderr.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Could not load config, using defaults: {}", e);
        AppConfig::default()
    });
    let state = Arc::new(Mutex::new(AppState::new(config)));
    let backend: Arc<dyn Backend> = Arc::new(FsBackend);

    let (proxy, mut events) = mpsc::unbounded_channel::<UserEvent>();
    let confirmer = Arc::new(PromptConfirmation::new(proxy.clone(), state.clone()));

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events.recv().await {
            let line = match app::encode_event(&event) {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to encode event: {}", e);
                    continue;
                }
            };
            if let Err(e) = write_line(&mut stdout, &line).await {
                tracing::error!("Failed to write event, stopping output: {}", e);
                break;
            }
        }
    });

    tracing::info!("Workshop cleaner ready; reading commands from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        app::handle_ipc_message(
            line,
            backend.clone(),
            confirmer.clone(),
            proxy.clone(),
            state.clone(),
        );
    }

    tracing::info!("Input closed. Saving final state...");
    let snapshot = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.")
        .config_snapshot();
    snapshot.save();
    // Let queued events drain; tasks still running may keep the channel open.
    drop(confirmer);
    drop(proxy);
    if tokio::time::timeout(Duration::from_secs(2), writer).await.is_err() {
        tracing::warn!("Event writer did not finish in time");
    }
    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, line: &str) -> std::io::Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
