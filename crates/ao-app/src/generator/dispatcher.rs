use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use ao_core::{GenerationSettings, Job};
use crate::backend::schemas::GenerateImageRequest;
use crate::backend::{Backend, Credential};
use crate::error::AppError;

/// Submits one Generate action to the backend and turns the answer into a `Job`.
pub struct GenerationDispatcher {
    backend: Arc<dyn Backend>,
}

impl GenerationDispatcher {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All-or-nothing: any failure leaves no job behind.
    pub async fn dispatch(
        &self,
        credential: Option<&Credential>,
        settings: &GenerationSettings,
    ) -> Result<Job, AppError> {
        let credential = credential.ok_or(AppError::AuthRequired)?;
        let prompt = settings.validate()?;

        let request = GenerateImageRequest::new(prompt, settings);
        info!(model = %settings.model, count = settings.count, "dispatching generation job");

        let response = self.backend.generate_image(credential, &request).await?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Image generation failed".to_string());
            return Err(AppError::BackendError(message));
        }

        if response.generations.is_empty() {
            return Err(AppError::BackendError(
                response
                    .message
                    .unwrap_or_else(|| "No generations were started".to_string()),
            ));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = response
            .generations
            .iter()
            .find(|g| !seen.insert(g.request_id.as_str()))
        {
            return Err(AppError::BackendError(format!(
                "Backend returned request id {} more than once",
                dup.request_id
            )));
        }

        if response.generations.len() != settings.count as usize {
            warn!(
                requested = settings.count,
                started = response.generations.len(),
                "backend started a different number of generations"
            );
        }

        let job = Job::new(
            settings.model,
            settings.config,
            response
                .generations
                .into_iter()
                .map(|g| (g.request_id, g.ai_generation_id)),
        );

        info!(job_id = %job.id, target = job.target_count, "generation job created");
        Ok(job)
    }
}
