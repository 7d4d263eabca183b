use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use ao_core::{GenerationSettings, Job, MediaItem};
use crate::backend::{Backend, Credential};
use crate::composer::PostComposer;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::events::EventSender;
use crate::generator::{GenerationDispatcher, GenerationPoller};
use crate::ingest::{SelectedFile, UploadIngestor};
use crate::state::{CreationFlow, SharedFlow};

/// One creation flow wired to the backend.
///
/// Dropping the studio cancels the poll task of the active job.
pub struct Studio {
    flow: SharedFlow,
    dispatcher: GenerationDispatcher,
    poller: GenerationPoller,
    ingestor: UploadIngestor,
    composer: PostComposer,
    poll_task: Option<JoinHandle<()>>,
    poll_token: Option<CancellationToken>,
}

impl Studio {
    pub fn new(backend: Arc<dyn Backend>, config: &AppConfig, events: Option<EventSender>) -> Self {
        Self::with_poll_interval(backend, config, config.poll_interval, events)
    }

    pub fn with_poll_interval(
        backend: Arc<dyn Backend>,
        config: &AppConfig,
        poll_interval: Duration,
        events: Option<EventSender>,
    ) -> Self {
        Self {
            flow: CreationFlow::new(events).into_shared(),
            dispatcher: GenerationDispatcher::new(backend.clone()),
            poller: GenerationPoller::new(backend.clone(), poll_interval),
            ingestor: UploadIngestor::new(config.max_upload_bytes),
            composer: PostComposer::new(backend),
            poll_task: None,
            poll_token: None,
        }
    }

    pub fn flow(&self) -> SharedFlow {
        self.flow.clone()
    }

    /// Dispatch a job and start polling it. Replaces any job still running.
    pub async fn generate(
        &mut self,
        credential: Option<&Credential>,
        settings: GenerationSettings,
    ) -> Result<Job, AppError> {
        let credential = credential.ok_or(AppError::AuthRequired)?;
        settings.validate()?;

        self.stop_polling();
        self.flow.lock().await.mark_dispatching();

        let job = match self.dispatcher.dispatch(Some(credential), &settings).await {
            Ok(job) => job,
            Err(error) => {
                self.flow.lock().await.dispatch_failed(&error);
                return Err(error);
            }
        };

        let token = self.flow.lock().await.begin_job(job.clone(), settings);
        let handle = self.poller.clone().spawn(
            credential.clone(),
            job.id.clone(),
            self.flow.clone(),
            token.clone(),
        );
        self.poll_task = Some(handle);
        self.poll_token = Some(token);

        Ok(job)
    }

    /// Wait until the poll task of the latest job has stopped.
    pub async fn wait_for_job(&mut self) {
        if let Some(handle) = self.poll_task.take() {
            let _ = handle.await;
        }
    }

    pub async fn upload(&self, files: &[SelectedFile]) -> Result<usize, AppError> {
        let items = self.ingestor.ingest(files)?;
        Ok(self.flow.lock().await.append_media(items))
    }

    pub async fn upload_paths(&self, paths: &[PathBuf]) -> Result<usize, AppError> {
        let items = self.ingestor.read_paths(paths).await?;
        Ok(self.flow.lock().await.append_media(items))
    }

    pub async fn prefill(&self, items: Vec<MediaItem>) -> usize {
        self.flow.lock().await.append_media(items)
    }

    pub async fn remove_media(&self, index: usize) -> Result<MediaItem, AppError> {
        self.flow.lock().await.remove_media(index)
    }

    pub async fn clear_all(&mut self) {
        self.flow.lock().await.clear_all();
        self.stop_polling();
    }

    /// Compose the current draft and submit it.
    ///
    /// On success the flow starts over; on failure media and caption stay for a retry.
    pub async fn publish(&mut self, credential: Option<&Credential>) -> Result<Option<String>, AppError> {
        let mut flow = self.flow.lock().await;
        let draft = flow.compose()?;
        let message = self.composer.submit(credential, &draft).await?;

        info!(category = draft.category.as_str(), "post published");
        flow.post_published(message.clone());
        drop(flow);

        self.stop_polling();
        Ok(message)
    }

    /// Cancel the poll task without waiting for an in-flight round.
    pub fn shutdown(&mut self) {
        self.stop_polling();
    }

    fn stop_polling(&mut self) {
        if let Some(token) = self.poll_token.take() {
            token.cancel();
        }
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        self.shutdown();
    }
}
