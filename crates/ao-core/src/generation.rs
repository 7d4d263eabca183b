use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{Error, Result};
use crate::model_types::{AspectRatio, ImageModel};
use crate::MAX_IMAGES_PER_JOB;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` respects Pending → Processing → terminal.
    pub fn can_advance_to(&self, next: GenerationStatus) -> bool {
        match (self, next) {
            (Self::Completed | Self::Failed, _) => false,
            (Self::Pending, Self::Pending) => false,
            (Self::Processing, Self::Pending | Self::Processing) => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub steps: u32,
    pub guidance_scale: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        ImageModel::default().default_config()
    }
}

/// Form state behind a single Generate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub prompt: String,
    pub model: ImageModel,
    pub config: GenerationConfig,
    pub count: u32,
    pub aspect_ratio: AspectRatio,
    pub style: String,
}

impl GenerationSettings {
    /// Settings for `prompt` using the model's default inference config.
    pub fn new(prompt: impl Into<String>, model: ImageModel) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            config: model.default_config(),
            count: 1,
            aspect_ratio: AspectRatio::default(),
            style: "realistic".to_string(),
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Check the local preconditions and return the trimmed prompt.
    pub fn validate(&self) -> Result<&str> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(Error::EmptyPrompt);
        }
        if !(1..=MAX_IMAGES_PER_JOB).contains(&self.count) {
            return Err(Error::InvalidImageCount { count: self.count, max: MAX_IMAGES_PER_JOB });
        }
        Ok(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub id: String,
    pub job_id: String,
    /// Backend-side generation record, attached to the post on submit
    pub ai_generation_id: String,
    pub model: ImageModel,
    pub config: GenerationConfig,
    pub status: GenerationStatus,
    pub result_url: Option<String>,
    pub error: Option<String>,
}

/// One batch of generation requests dispatched by a single Generate action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub requests: Vec<GenerationRequest>,
    pub target_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Build a job from `(request_id, ai_generation_id)` pairs, all pending.
    pub fn new<I>(model: ImageModel, config: GenerationConfig, generations: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let id = Uuid::new_v4().to_string();
        let requests: Vec<GenerationRequest> = generations
            .into_iter()
            .map(|(request_id, ai_generation_id)| GenerationRequest {
                id: request_id,
                job_id: id.clone(),
                ai_generation_id,
                model,
                config,
                status: GenerationStatus::Pending,
                result_url: None,
                error: None,
            })
            .collect();

        Self {
            id,
            target_count: requests.len(),
            requests,
            created_at: Utc::now(),
        }
    }

    /// Ids of requests that have not reached a terminal state yet
    pub fn outstanding_ids(&self) -> Vec<String> {
        self.requests
            .iter()
            .filter(|r| r.status.is_active())
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn request(&self, id: &str) -> Option<&GenerationRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.count_status(GenerationStatus::Completed)
    }

    pub fn failed_count(&self) -> usize {
        self.count_status(GenerationStatus::Failed)
    }

    pub fn is_settled(&self) -> bool {
        self.requests.iter().all(|r| r.status.is_terminal())
    }

    /// Percentage of the target that completed, never above 100.
    pub fn progress(&self) -> f32 {
        if self.target_count == 0 {
            return 0.0;
        }
        let pct = self.completed_count() as f32 / self.target_count as f32 * 100.0;
        pct.min(100.0)
    }

    pub(crate) fn request_mut(&mut self, id: &str) -> Option<&mut GenerationRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    fn count_status(&self, status: GenerationStatus) -> usize {
        self.requests.iter().filter(|r| r.status == status).count()
    }
}
