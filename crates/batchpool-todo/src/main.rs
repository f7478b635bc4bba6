use anyhow::Context;
use batchpool::CancellationToken;
use batchpool_todo::{
    common::model::CreateTodo,
    service::{
        config::{AppConfig, CliArgs, Input},
        handler::TodoService,
        repository::MemoryRepository,
        telemetry::init_telemetry,
    },
};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::signal;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry(config.log_json)?;

    if cfg!(debug_assertions) {
        tracing::info!("Starting with full config: {config:#?}");
    } else {
        tracing::info!("Starting with {} workers", config.num_workers);
    }

    let items = read_items(&config.input).await?;

    let mut service = TodoService::new(Arc::new(MemoryRepository::new()), config.num_workers);
    if let Some(timeout) = config.timeout {
        service = service.with_timeout(timeout);
    }

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let created = service.bulk_create_with_token(&cancel, items).await;
    watcher.abort();
    let created = created.context("Batch was not stored")?;

    let mut out = serde_json::to_vec_pretty(&created)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}

async fn read_items(input: &Input) -> anyhow::Result<Vec<CreateTodo>> {
    let raw = match input {
        Input::Stdin => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read items from stdin")?;
            buf
        }
        Input::File(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read items from {}", path.display()))?,
    };

    let items: Vec<CreateTodo> =
        serde_json::from_slice(&raw).context("Expected a JSON array of todo items")?;
    tracing::debug!("Read {} items", items.len());
    Ok(items)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal, cancelling batch"),
        () = terminate => tracing::info!("Received SIGTERM signal, cancelling batch"),
    }
}
