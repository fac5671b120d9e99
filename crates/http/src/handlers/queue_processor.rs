use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use pmos_core::{DrainReport, env_parse_with_default};

use crate::AppState;
use crate::api_error::ApiError;

const DEFAULT_POLL_SECS: u64 = 15;

fn poll_interval() -> Duration {
    Duration::from_secs(env_parse_with_default("PMOS_IMPACT_POLL_SECS", DEFAULT_POLL_SECS).max(1))
}

fn drain_permits(state: &AppState) -> u32 {
    u32::try_from(state.services.impact.workers()).unwrap_or(u32::MAX)
}

/// Drain the impact queue while holding a full set of analysis permits, so
/// manual and background drains never exceed the configured worker count
/// between them.
pub(crate) async fn drain_with_permits(
    state: &AppState,
    limit: Option<usize>,
) -> Result<DrainReport, ApiError> {
    let _permits = Arc::clone(&state.semaphore)
        .acquire_many_owned(drain_permits(state))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(state.services.impact.drain(limit).await?)
}

/// Spawns the background task that drains due impact rows on an interval.
pub fn start_background_processor(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !state.processing_active.load(Ordering::SeqCst) {
                continue;
            }
            // A manual drain holds the permits; pick the rows up next tick.
            let Ok(_permits) =
                Arc::clone(&state.semaphore).try_acquire_many_owned(drain_permits(&state))
            else {
                tracing::debug!("impact worker: drain already running");
                continue;
            };
            if let Err(e) = state.services.impact.drain(None).await {
                tracing::error!(error = %e, "impact worker: drain failed");
            }
        }
    });
}

/// Releases impact rows stranded in `processing` by a previous run.
///
/// # Errors
/// Returns error if the storage operation fails.
pub async fn run_startup_recovery(state: &AppState) -> anyhow::Result<usize> {
    let released = state.services.impact.release_stale().await?;
    if released > 0 {
        tracing::info!(released, "startup recovery: stale impact rows back to pending");
    }
    Ok(released)
}
