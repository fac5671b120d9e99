use std::sync::Arc;

use anyhow::{Context, Result};
use pmos_service::{EVENT_CHANNEL_CAPACITY, Services};
use pmos_storage::StorageBackend;
use tokio::sync::broadcast;

use crate::llm_from_env;

/// One drain outside the server, e.g. from cron.
pub(crate) async fn run(limit: Option<usize>, database_url: &str) -> Result<()> {
    let storage = Arc::new(StorageBackend::new_postgres(database_url).await?);
    let llm = llm_from_env()?.context("PMOS_LLM_API_KEY must be set to drain the impact queue")?;
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let services = Services::new(storage, Some(llm), event_tx);

    let released = services.impact.release_stale().await?;
    if released > 0 {
        println!("Released {released} stale rows");
    }
    let report = services.impact.drain(limit).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
