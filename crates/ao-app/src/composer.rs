use std::sync::Arc;
use tracing::info;
use ao_core::PostDraft;
use crate::backend::schemas::CreatePostRequest;
use crate::backend::{Backend, Credential};
use crate::error::AppError;

/// Submits finished drafts to the create-post endpoint.
pub struct PostComposer {
    backend: Arc<dyn Backend>,
}

impl PostComposer {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Returns the backend's confirmation message, if any.
    pub async fn submit(
        &self,
        credential: Option<&Credential>,
        draft: &PostDraft,
    ) -> Result<Option<String>, AppError> {
        let credential = credential.ok_or(AppError::AuthRequired)?;
        let request = CreatePostRequest::from(draft);

        info!(
            category = draft.category.as_str(),
            media = draft.media_items.len(),
            ai_generated = request.ai_generated,
            "submitting post"
        );

        let response = self.backend.create_post(credential, &request).await?;
        if !response.success {
            return Err(AppError::BackendError(
                response
                    .message
                    .unwrap_or_else(|| "Failed to create post".to_string()),
            ));
        }

        Ok(response.message)
    }
}
