mod client;
pub mod schemas;

pub use client::HttpBackend;

use std::fmt;
use async_trait::async_trait;
use crate::backend::schemas::{
    CreatePostRequest, CreatePostResponse, GenerateImageRequest, GenerateImageResponse,
    GenerationStatusResponse,
};
use crate::error::AppError;

/// Bearer token for the backend API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// `None` for a blank token.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// The three backend calls the engine depends on.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /api/posts/generate-image`
    async fn generate_image(
        &self,
        credential: &Credential,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, AppError>;

    /// `GET /api/posts/generation/{request_id}`
    async fn generation_status(
        &self,
        credential: &Credential,
        request_id: &str,
    ) -> Result<GenerationStatusResponse, AppError>;

    /// `POST /api/posts`
    async fn create_post(
        &self,
        credential: &Credential,
        request: &CreatePostRequest,
    ) -> Result<CreatePostResponse, AppError>;
}
