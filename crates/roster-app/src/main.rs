use std::sync::Arc;

use anyhow::Context;
use roster_core::config::{Settings, load_config};
use roster_db::db::connection::create_pool;
use roster_service::auth::{
    AccessDirectory, Authorizer, FileAccessService, InMemoryDirectory, load_tier_table,
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use crate::request::{AccessRequest, dispatch};

mod request;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    tracing::debug!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let tiers = load_tier_table(config.authorization.policy_path.as_deref()).await?;
    let authorizer = Authorizer::new(Arc::new(tiers));

    let request = read_request(std::env::args().nth(1)).await?;

    if let Some(path) = config.catalog.path.as_deref() {
        let directory = InMemoryDirectory::from_json_file(path).await?;
        run(&config, authorizer, directory, request).await
    } else if let Some(url) = config.database.url.as_deref() {
        let pool = create_pool(url, u32::from(config.database.max_connections)).await?;
        tracing::info!("Database connection pool created.");
        run(&config, authorizer, pool, request).await
    } else {
        anyhow::bail!("either catalog.path or database.url must be configured")
    }
}

/// Reads the request from `path`, or from stdin when no path is given.
async fn read_request(path: Option<String>) -> anyhow::Result<AccessRequest> {
    let json = match path {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("cannot read request file {path}"))?,
        None => {
            let mut json = String::new();
            tokio::io::stdin().read_to_string(&mut json).await?;
            json
        }
    };

    serde_json::from_str(&json).context("invalid access request")
}

async fn run<D: AccessDirectory>(
    config: &Settings,
    authorizer: Authorizer,
    directory: D,
    request: AccessRequest,
) -> anyhow::Result<()> {
    let service = FileAccessService::new(authorizer, directory, config.authorization.denial_status);
    let response = dispatch(&service, request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
