//! Job API handlers.

use axum::{extract::State, Json};
use optimux_core::{EngineError, MediaInfo, ProcessRequest, ProcessResult};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::error::ApiError;
use crate::metrics::{JOBS_ACTIVE, JOBS_TOTAL, JOB_DURATION};
use crate::state::AppState;

/// Request body for probing a file
#[derive(Debug, Deserialize)]
pub struct ProbeBody {
    pub path: PathBuf,
}

/// Run a conversion job and wait for its result.
///
/// Engine events are relayed to WebSocket clients, tagged with the job id.
/// The job and its bookkeeping run on their own task and finish even if the
/// client disconnects.
pub async fn process_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProcessRequest>,
) -> Result<Json<ProcessResult>, ApiError> {
    let job_id = request.job_id.clone();
    let job = tokio::spawn(run_job(state, request));

    match job.await {
        Ok(result) => Ok(Json(result?)),
        Err(e) => {
            error!(job_id = %job_id, "Job task failed: {}", e);
            Err(ApiError::new(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "job task failed",
            ))
        }
    }
}

/// Runs one job to completion and broadcasts its outcome.
async fn run_job(
    state: Arc<AppState>,
    request: ProcessRequest,
) -> Result<ProcessResult, EngineError> {
    let job_id = request.job_id.clone();
    let broadcaster = state.ws_broadcaster().clone();
    broadcaster.job_started(&job_id);

    let (tx, mut rx) = mpsc::channel(state.config().engine.event_buffer);
    let relay = {
        let broadcaster = broadcaster.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                broadcaster.engine_event(&job_id, event);
            }
        })
    };

    JOBS_ACTIVE.inc();
    let start = Instant::now();
    let result = state.engine().process(request, Some(tx)).await;
    JOBS_ACTIVE.dec();
    JOB_DURATION.observe(start.elapsed().as_secs_f64());

    // The engine has dropped its sender by now; drain what is left.
    if let Err(e) = relay.await {
        error!(job_id = %job_id, "Event relay task failed: {}", e);
    }

    match &result {
        Ok(result) => {
            JOBS_TOTAL.with_label_values(&["completed"]).inc();
            info!(job_id = %job_id, files = result.files.len(), "Job finished");
            broadcaster.job_completed(&job_id, result.files.clone());
        }
        Err(e) => {
            JOBS_TOTAL.with_label_values(&[e.kind()]).inc();
            broadcaster.job_failed(&job_id, e.kind(), &e.to_string());
        }
    }
    result
}

/// Inspect a media file.
pub async fn probe(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ProbeBody>,
) -> Result<Json<MediaInfo>, ApiError> {
    if body.path.as_os_str().is_empty() {
        return Err(ApiError::bad_request("input", "path is empty"));
    }
    let info = state.engine().probe(&body.path).await?;
    Ok(Json(info))
}
