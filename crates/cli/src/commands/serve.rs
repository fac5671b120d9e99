use std::sync::Arc;

use anyhow::Result;
use pmos_http::{AppState, create_router, run_startup_recovery, start_background_processor};
use pmos_storage::StorageBackend;

use crate::llm_from_env;

pub(crate) async fn run(port: u16, host: String, database_url: Option<&str>) -> Result<()> {
    let storage = Arc::new(StorageBackend::connect(database_url).await?);
    tracing::info!(backend = storage.backend_name(), "storage ready");

    let llm = llm_from_env()?;
    let has_llm = llm.is_some();
    let state = Arc::new(AppState::new(storage, llm));

    if let Err(e) = run_startup_recovery(&state).await {
        tracing::warn!(error = %e, "startup recovery failed");
    }
    if has_llm {
        start_background_processor(Arc::clone(&state));
    } else {
        tracing::warn!("PMOS_LLM_API_KEY not set, LLM functions and the impact worker are disabled");
    }

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
