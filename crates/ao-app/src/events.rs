use tokio::sync::mpsc::UnboundedSender;
use ao_core::MediaItem;

#[derive(Debug, Clone, PartialEq)]
pub enum StudioEvent {
    JobQueued {
        job_id: String,
        target: usize,
    },
    JobProgress {
        job_id: String,
        progress: f32,
        message: String,
    },
    MediaAdded {
        job_id: Option<String>,
        items: Vec<MediaItem>,
    },
    /// Non-fatal, e.g. some generations of a job failed
    GenerationNotice {
        job_id: String,
        message: String,
    },
    JobComplete {
        job_id: String,
        completed: usize,
        failed: usize,
    },
    JobFailed {
        job_id: String,
        error: String,
    },
    PostPublished {
        message: Option<String>,
    },
}

pub type EventSender = UnboundedSender<StudioEvent>;
