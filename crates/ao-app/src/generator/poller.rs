use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use ao_core::StatusUpdate;
use crate::backend::{Backend, Credential};
use crate::error::AppError;
use crate::state::SharedFlow;

/// Fixed polling cadence of the generation status endpoint
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Drives the status rounds of one job until it settles or is cancelled.
///
/// A round queries every outstanding request concurrently and joins on all
/// of them before anything is merged. The next tick is only scheduled once
/// the previous round has been applied, so rounds never overlap.
#[derive(Clone)]
pub struct GenerationPoller {
    backend: Arc<dyn Backend>,
    interval: Duration,
}

impl GenerationPoller {
    pub fn new(backend: Arc<dyn Backend>, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Query all `request_ids` at once. Any failed query fails the whole round.
    pub async fn query_round(
        &self,
        credential: &Credential,
        request_ids: &[String],
    ) -> Result<Vec<StatusUpdate>, AppError> {
        let queries = request_ids.iter().map(|id| async move {
            let response = self.backend.generation_status(credential, id).await?;
            Ok::<_, AppError>(response.into_update(id))
        });

        join_all(queries).await.into_iter().collect()
    }

    pub fn spawn(
        self,
        credential: Credential,
        job_id: String,
        flow: SharedFlow,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(credential, job_id, flow, token).await })
    }

    pub async fn run(
        &self,
        credential: Credential,
        job_id: String,
        flow: SharedFlow,
        token: CancellationToken,
    ) {
        info!(%job_id, interval_ms = self.interval.as_millis() as u64, "polling generation job");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!(%job_id, "poll loop cancelled");
                    return;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let Some(request_ids) = flow.lock().await.outstanding_ids(&job_id) else {
                return;
            };

            let round = self.query_round(&credential, &request_ids).await;

            let mut state = flow.lock().await;
            if token.is_cancelled() {
                debug!(%job_id, "discarding round finished after cancellation");
                return;
            }

            match round {
                Ok(updates) => match state.apply_round(&job_id, updates) {
                    Some(summary) if !summary.decision.is_terminal() => {
                        debug!(%job_id, completed = summary.completed, target = summary.target, "round applied");
                    }
                    _ => return,
                },
                Err(error) => {
                    state.abort_job(&job_id, &error);
                    return;
                }
            }
        }
    }
}
