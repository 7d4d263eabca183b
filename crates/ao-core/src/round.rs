//! Reconciling one poll round of status responses into a job and its media.

use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::collection::MediaCollection;
use crate::generation::{GenerationStatus, Job};
use crate::media::MediaItem;

/// Classified status of one generation request as reported in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub request_id: String,
    pub status: GenerationStatus,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

impl StatusUpdate {
    pub fn processing(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Processing,
            result_url: None,
            error: None,
        }
    }

    pub fn completed(request_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Completed,
            result_url: Some(url.into()),
            error: None,
        }
    }

    pub fn failed(request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            status: GenerationStatus::Failed,
            result_url: None,
            error: Some(error.into()),
        }
    }

    /// Classify a raw backend status string.
    ///
    /// A "completed" report without an image url is treated as a failure,
    /// unknown strings as still processing.
    pub fn from_backend(request_id: impl Into<String>, status: &str, image_url: Option<String>) -> Self {
        let request_id = request_id.into();
        match status.trim().to_ascii_lowercase().as_str() {
            "completed" => match image_url.filter(|u| !u.trim().is_empty()) {
                Some(url) => Self::completed(request_id, url),
                None => Self::failed(request_id, "Generation completed without an image"),
            },
            "failed" => Self::failed(request_id, "Generation failed"),
            _ => Self::processing(request_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollDecision {
    Continue,
    Succeeded,
    PartiallySucceeded { failed: usize },
    Failed,
}

impl PollDecision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Aggregate outcome of a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub job_id: String,
    /// Items this round added to the collection, in append order
    pub appended: Vec<MediaItem>,
    pub newly_completed: usize,
    pub newly_failed: usize,
    pub completed: usize,
    pub failed: usize,
    pub target: usize,
    pub progress: f32,
    pub decision: PollDecision,
    /// Error text of the requests that failed in this round
    pub errors: Vec<String>,
}

impl RoundSummary {
    pub fn status_message(&self) -> String {
        match self.decision {
            PollDecision::Continue => {
                format!("Generating images... {}/{} complete", self.completed, self.target)
            }
            PollDecision::Succeeded => format!("Generated {} image(s)", self.completed),
            PollDecision::PartiallySucceeded { .. } => {
                format!("Generated {} of {} image(s)", self.completed, self.target)
            }
            PollDecision::Failed => "All generations failed".to_string(),
        }
    }

    /// Non-fatal notice for rounds that observed new failures.
    pub fn failure_notice(&self) -> Option<String> {
        (self.newly_failed > 0).then(|| format!("{} generation(s) failed", self.failed))
    }

    /// Message surfaced when the whole job failed.
    pub fn fatal_error(&self) -> Option<String> {
        if self.decision != PollDecision::Failed {
            return None;
        }
        Some(
            self.errors
                .first()
                .cloned()
                .unwrap_or_else(|| "All generations failed".to_string()),
        )
    }
}

impl Job {
    /// Apply one joined round of updates and merge newly completed results into `media`.
    ///
    /// Updates for unknown requests and transitions out of a terminal state
    /// are ignored, so re-reported results are a no-op.
    pub fn reconcile<I>(&mut self, updates: I, media: &mut MediaCollection) -> RoundSummary
    where
        I: IntoIterator<Item = StatusUpdate>,
    {
        let mut batch = Vec::new();
        let mut errors = Vec::new();
        let mut newly_completed = 0;
        let mut newly_failed = 0;

        for update in updates {
            let Some(request) = self.request_mut(&update.request_id) else {
                debug!(request_id = %update.request_id, "ignoring update for unknown request");
                continue;
            };

            if !request.status.can_advance_to(update.status) {
                continue;
            }

            match update.status {
                GenerationStatus::Completed => {
                    let Some(url) = update.result_url else {
                        debug!(request_id = %request.id, "completed update without url");
                        continue;
                    };
                    request.status = GenerationStatus::Completed;
                    newly_completed += 1;
                    request.result_url = Some(url.clone());
                    batch.push(MediaItem::generated(url, request.id.clone()));
                }
                GenerationStatus::Failed => {
                    request.status = GenerationStatus::Failed;
                    newly_failed += 1;
                    let error = update.error.unwrap_or_else(|| "Generation failed".to_string());
                    request.error = Some(error.clone());
                    errors.push(error);
                }
                status => request.status = status,
            }
        }

        let before = media.len();
        media.append(batch);
        let appended = media.items()[before..].to_vec();

        let completed = self.completed_count();
        let failed = self.failed_count();
        let decision = if completed == self.target_count {
            PollDecision::Succeeded
        } else if self.is_settled() {
            if completed == 0 {
                PollDecision::Failed
            } else {
                PollDecision::PartiallySucceeded { failed }
            }
        } else {
            PollDecision::Continue
        };

        RoundSummary {
            job_id: self.id.clone(),
            appended,
            newly_completed,
            newly_failed,
            completed,
            failed,
            target: self.target_count,
            progress: self.progress(),
            decision,
            errors,
        }
    }
}
