use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use crate::backend::schemas::{
    CreatePostRequest, CreatePostResponse, ErrorBody, GenerateImageRequest,
    GenerateImageResponse, GenerationStatusResponse,
};
use crate::backend::{Backend, Credential};
use crate::config::AppConfig;
use crate::error::AppError;

/// `Backend` over HTTP with bearer authentication.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AppError::AuthRequired);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message.or(b.error))
                .unwrap_or_else(|| format!("HTTP {}: {}", status, body));
            return Err(AppError::BackendError(message));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn generate_image(
        &self,
        credential: &Credential,
        request: &GenerateImageRequest,
    ) -> Result<GenerateImageResponse, AppError> {
        let response = self
            .client
            .post(self.url("/api/posts/generate-image"))
            .bearer_auth(credential.token())
            .json(request)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn generation_status(
        &self,
        credential: &Credential,
        request_id: &str,
    ) -> Result<GenerationStatusResponse, AppError> {
        debug!(request_id, "querying generation status");
        let response = self
            .client
            .get(self.url(&format!("/api/posts/generation/{request_id}")))
            .bearer_auth(credential.token())
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn create_post(
        &self,
        credential: &Credential,
        request: &CreatePostRequest,
    ) -> Result<CreatePostResponse, AppError> {
        let response = self
            .client
            .post(self.url("/api/posts"))
            .bearer_auth(credential.token())
            .json(request)
            .send()
            .await?;

        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.url("/api/posts"), "http://127.0.0.1:5000/api/posts");
    }
}
