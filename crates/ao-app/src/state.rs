//! State owned by one creation flow: the draft's media, the active job and the form fields.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ao_core::post::parse_tags;
use ao_core::{
    AiDetails, GenerationSettings, Job, MediaCollection, MediaItem, PollDecision, PostDraft,
    RoundSummary, StatusUpdate, Visibility,
};
use crate::error::AppError;
use crate::events::{EventSender, StudioEvent};

pub type SharedFlow = Arc<Mutex<CreationFlow>>;

struct ActiveJob {
    job: Job,
    token: CancellationToken,
}

#[derive(Default)]
pub struct CreationFlow {
    media: MediaCollection,
    active: Option<ActiveJob>,
    is_generating: bool,
    progress: f32,
    status: String,
    caption: String,
    tags: Vec<String>,
    visibility: Visibility,
    // request id -> backend generation id
    generation_ids: HashMap<String, String>,
    last_settings: Option<GenerationSettings>,
    events: Option<EventSender>,
}

impl CreationFlow {
    pub fn new(events: Option<EventSender>) -> Self {
        Self {
            events,
            status: "Ready".to_string(),
            ..Self::default()
        }
    }

    pub fn into_shared(self) -> SharedFlow {
        Arc::new(Mutex::new(self))
    }

    pub fn media(&self) -> &MediaCollection {
        &self.media
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn active_job(&self) -> Option<&Job> {
        self.active.as_ref().map(|a| &a.job)
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    /// Replace the tags with the ones parsed from free text.
    pub fn set_tags(&mut self, input: &str) {
        self.tags = parse_tags(input);
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// Append uploaded or prefilled media as one batch.
    pub fn append_media(&mut self, items: Vec<MediaItem>) -> usize {
        let before = self.media.len();
        let added = self.media.append(items);
        if added > 0 {
            let items = self.media.items()[before..].to_vec();
            self.emit(StudioEvent::MediaAdded { job_id: None, items });
        }
        added
    }

    pub fn remove_media(&mut self, index: usize) -> Result<MediaItem, AppError> {
        let item = self.media.remove(index)?;
        if let Some(request_id) = &item.source_request_id {
            self.generation_ids.remove(request_id);
        }
        Ok(item)
    }

    /// "Clear all": drop every media item and cancel the active job.
    pub fn clear_all(&mut self) {
        self.cancel_job();
        self.media.clear();
        self.generation_ids.clear();
        self.last_settings = None;
        self.progress = 0.0;
        self.status = "Ready".to_string();
    }

    /// Cancel polling for the active job; results of an in-flight round are dropped.
    pub fn cancel_job(&mut self) {
        if let Some(active) = self.active.take() {
            info!(job_id = %active.job.id, "cancelling generation job");
            active.token.cancel();
        }
        self.is_generating = false;
    }

    /// Called right before the dispatch call goes out.
    pub fn mark_dispatching(&mut self) {
        self.cancel_job();
        self.is_generating = true;
        self.progress = 0.0;
        self.status = "Submitting generation request...".to_string();
    }

    pub fn dispatch_failed(&mut self, error: &AppError) {
        warn!(%error, "generation dispatch failed");
        self.is_generating = false;
        self.progress = 0.0;
        self.status = error.to_string();
    }

    /// Make `job` the active job and return the token its poll task must honour.
    pub fn begin_job(&mut self, job: Job, settings: GenerationSettings) -> CancellationToken {
        self.cancel_job();

        for request in &job.requests {
            self.generation_ids
                .insert(request.id.clone(), request.ai_generation_id.clone());
        }

        let token = CancellationToken::new();
        self.is_generating = true;
        self.progress = 0.0;
        self.status = format!("Generating {} image(s)...", job.target_count);
        self.last_settings = Some(settings);

        self.emit(StudioEvent::JobQueued {
            job_id: job.id.clone(),
            target: job.target_count,
        });
        self.active = Some(ActiveJob { job, token: token.clone() });
        token
    }

    /// Outstanding request ids of `job_id`, or `None` if that job is no longer active.
    pub fn outstanding_ids(&self, job_id: &str) -> Option<Vec<String>> {
        self.live_job(job_id).map(|a| a.job.outstanding_ids())
    }

    /// Merge a joined round into the flow. Returns `None` when the round is stale.
    pub fn apply_round(&mut self, job_id: &str, updates: Vec<StatusUpdate>) -> Option<RoundSummary> {
        let summary = {
            let Some(active) = self
                .active
                .as_mut()
                .filter(|a| a.job.id == job_id && !a.token.is_cancelled())
            else {
                debug!(job_id, "dropping results of a cancelled round");
                return None;
            };
            active.job.reconcile(updates, &mut self.media)
        };

        self.progress = summary.progress;
        self.status = summary.status_message();

        if !summary.appended.is_empty() {
            info!(job_id, added = summary.appended.len(), "merged generated media");
            self.emit(StudioEvent::MediaAdded {
                job_id: Some(job_id.to_string()),
                items: summary.appended.clone(),
            });
        }

        self.emit(StudioEvent::JobProgress {
            job_id: job_id.to_string(),
            progress: summary.progress,
            message: summary.status_message(),
        });

        if let Some(message) = summary.failure_notice() {
            warn!(job_id, %message, "partial generation failure");
            self.emit(StudioEvent::GenerationNotice {
                job_id: job_id.to_string(),
                message,
            });
        }

        if summary.decision.is_terminal() {
            self.finish_job(&summary);
        }

        Some(summary)
    }

    /// Stop the job after a failed round; media merged so far stays.
    pub fn abort_job(&mut self, job_id: &str, error: &AppError) {
        if self.live_job(job_id).is_none() {
            return;
        }
        warn!(job_id, %error, "aborting generation job");
        self.cancel_job();
        self.status = error.to_string();
        self.emit(StudioEvent::JobFailed {
            job_id: job_id.to_string(),
            error: error.to_string(),
        });
    }

    /// Snapshot the current state into a draft.
    pub fn compose(&self) -> Result<PostDraft, AppError> {
        let ai_details = self.last_settings.as_ref().map(|s| AiDetails {
            model: s.model.id().to_string(),
            prompt: s.prompt.trim().to_string(),
            style: s.style.clone(),
            aspect_ratio: s.aspect_ratio.as_str().to_string(),
            steps: s.config.steps,
        });

        let draft = PostDraft::compose(
            &self.media,
            &self.caption,
            &self.generation_ids,
            ai_details,
            self.tags.clone(),
            self.visibility,
        )?;

        Ok(draft)
    }

    /// Back to an empty flow after a successful post.
    pub fn reset(&mut self) {
        self.clear_all();
        self.caption.clear();
        self.tags.clear();
        self.visibility = Visibility::default();
    }

    pub fn post_published(&mut self, message: Option<String>) {
        self.reset();
        self.emit(StudioEvent::PostPublished { message });
    }

    fn live_job(&self, job_id: &str) -> Option<&ActiveJob> {
        self.active
            .as_ref()
            .filter(|a| a.job.id == job_id && !a.token.is_cancelled())
    }

    fn finish_job(&mut self, summary: &RoundSummary) {
        if let Some(active) = self.active.take() {
            active.token.cancel();
        }
        self.is_generating = false;

        match summary.decision {
            PollDecision::Failed => {
                let error = summary
                    .fatal_error()
                    .unwrap_or_else(|| "All generations failed".to_string());
                warn!(job_id = %summary.job_id, %error, "generation job failed");
                self.emit(StudioEvent::JobFailed {
                    job_id: summary.job_id.clone(),
                    error,
                });
            }
            _ => {
                info!(job_id = %summary.job_id, completed = summary.completed, failed = summary.failed, "generation job finished");
                self.emit(StudioEvent::JobComplete {
                    job_id: summary.job_id.clone(),
                    completed: summary.completed,
                    failed: summary.failed,
                });
            }
        }
    }

    fn emit(&self, event: StudioEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is listening any more
            let _ = events.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use ao_core::{ImageModel, MediaKind};
    use super::*;

    fn settings() -> GenerationSettings {
        GenerationSettings::new("a lighthouse at dusk", ImageModel::FluxSchnell).with_count(2)
    }

    fn job() -> Job {
        let pairs = vec![
            ("req-0".to_string(), "gen-0".to_string()),
            ("req-1".to_string(), "gen-1".to_string()),
        ];
        Job::new(ImageModel::FluxSchnell, ImageModel::FluxSchnell.default_config(), pairs)
    }

    #[test]
    fn test_begin_job_sets_generating_and_resets_progress() {
        let mut flow = CreationFlow::new(None);
        flow.mark_dispatching();
        let token = flow.begin_job(job(), settings());

        assert!(flow.is_generating());
        assert_eq!(flow.progress(), 0.0);
        assert!(!token.is_cancelled());
        assert_eq!(flow.active_job().unwrap().target_count, 2);
    }

    #[test]
    fn test_stale_round_is_dropped_after_clear_all() {
        let mut flow = CreationFlow::new(None);
        let job = job();
        let job_id = job.id.clone();
        let token = flow.begin_job(job, settings());

        flow.clear_all();

        assert!(token.is_cancelled());
        assert!(flow.outstanding_ids(&job_id).is_none());
        let applied = flow.apply_round(&job_id, vec![StatusUpdate::completed("req-0", "a")]);
        assert!(applied.is_none());
        assert!(flow.media().is_empty());
        assert!(!flow.is_generating());
    }

    #[test]
    fn test_new_job_cancels_previous() {
        let mut flow = CreationFlow::new(None);
        let first = flow.begin_job(job(), settings());
        let _second = flow.begin_job(job(), settings());
        assert!(first.is_cancelled());
    }

    #[test]
    fn test_terminal_round_finishes_job() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut flow = CreationFlow::new(Some(tx));
        let job = job();
        let job_id = job.id.clone();
        let token = flow.begin_job(job, settings());

        let summary = flow
            .apply_round(
                &job_id,
                vec![StatusUpdate::completed("req-0", "a"), StatusUpdate::completed("req-1", "b")],
            )
            .unwrap();

        assert_eq!(summary.decision, PollDecision::Succeeded);
        assert!(token.is_cancelled());
        assert!(!flow.is_generating());
        assert_eq!(flow.progress(), 100.0);
        assert!(flow.active_job().is_none());

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events[0], StudioEvent::JobQueued { target: 2, .. }));
        assert!(events.iter().any(|e| matches!(e, StudioEvent::MediaAdded { items, .. } if items.len() == 2)));
        assert!(matches!(events.last(), Some(StudioEvent::JobComplete { completed: 2, failed: 0, .. })));
    }

    #[test]
    fn test_abort_keeps_media() {
        let mut flow = CreationFlow::new(None);
        let job = job();
        let job_id = job.id.clone();
        flow.begin_job(job, settings());
        flow.apply_round(&job_id, vec![StatusUpdate::completed("req-0", "a"), StatusUpdate::processing("req-1")]);

        flow.abort_job(&job_id, &AppError::Transport("connection reset".into()));

        assert_eq!(flow.media().len(), 1);
        assert!(!flow.is_generating());
        assert!(flow.status().contains("connection reset"));
    }

    #[test]
    fn test_compose_carries_ai_details_and_generation_ids() {
        let mut flow = CreationFlow::new(None);
        let job = job();
        let job_id = job.id.clone();
        flow.begin_job(job, settings().with_style("noir"));
        flow.apply_round(&job_id, vec![StatusUpdate::completed("req-1", "b"), StatusUpdate::processing("req-0")]);
        flow.set_caption("evening walk");
        flow.set_tags("#Sea, dusk");

        let draft = flow.compose().unwrap();

        assert_eq!(draft.ai_generation_ids, vec!["gen-1"]);
        assert_eq!(draft.tags, vec!["sea", "dusk"]);
        let details = draft.ai_details.unwrap();
        assert_eq!(details.style, "noir");
        assert_eq!(details.model, "flux-schnell");
        assert_eq!(details.steps, 4);
    }

    #[test]
    fn test_removing_generated_item_drops_its_id() {
        let mut flow = CreationFlow::new(None);
        let job = job();
        let job_id = job.id.clone();
        flow.begin_job(job, settings());
        flow.apply_round(&job_id, vec![StatusUpdate::completed("req-0", "a"), StatusUpdate::completed("req-1", "b")]);
        flow.append_media(vec![MediaItem::prefilled(MediaKind::Image, "c")]);

        flow.remove_media(0).unwrap();

        let draft = flow.compose().unwrap();
        assert_eq!(draft.ai_generation_ids, vec!["gen-1"]);
        assert_eq!(draft.media_items.len(), 2);
    }

    #[test]
    fn test_uploads_after_clear_all_carry_no_ai_details() {
        let mut flow = CreationFlow::new(None);
        let job = job();
        let job_id = job.id.clone();
        flow.begin_job(job, settings());
        flow.apply_round(&job_id, vec![StatusUpdate::completed("req-0", "a"), StatusUpdate::completed("req-1", "b")]);

        flow.clear_all();
        flow.append_media(vec![MediaItem::uploaded(MediaKind::Image, "data:image/png;base64,AA==".into())]);

        let draft = flow.compose().unwrap();
        assert!(draft.ai_details.is_none());
        assert!(draft.ai_generation_ids.is_empty());
        assert!(!draft.is_ai_generated());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut flow = CreationFlow::new(None);
        flow.append_media(vec![MediaItem::prefilled(MediaKind::Image, "a")]);
        flow.set_caption("hello");
        flow.set_tags("one two");

        flow.reset();

        assert!(flow.media().is_empty());
        assert!(flow.caption().is_empty());
        assert!(flow.tags().is_empty());
        assert!(matches!(flow.compose(), Err(AppError::Core(ao_core::Error::EmptyDraft))));
    }
}
