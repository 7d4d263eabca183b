use serde::{Deserialize, Serialize};
use ao_core::{
    AiDetails, GenerationSettings, MediaItem, MediaKind, PostCategory, PostDraft, PostType,
    StatusUpdate, Visibility,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub prompt: String,
    pub image_size: String,
    pub style: String,
    pub aspect_ratio: String,
    pub selected_model: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub num_images: u32,
}

impl GenerateImageRequest {
    /// Wire request for already validated settings; `prompt` is the trimmed prompt.
    pub fn new(prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            prompt: prompt.to_string(),
            image_size: settings.aspect_ratio.image_size().to_string(),
            style: settings.style.clone(),
            aspect_ratio: settings.aspect_ratio.as_str().to_string(),
            selected_model: settings.model.id().to_string(),
            num_inference_steps: settings.config.steps,
            guidance_scale: settings.config.guidance_scale,
            num_images: settings.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationHandle {
    pub request_id: String,
    pub ai_generation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    pub success: bool,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub generations: Vec<GenerationHandle>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub status: String,
    pub image_url: Option<String>,
    pub message: Option<String>,
}

impl GenerationStatusResponse {
    pub fn into_update(self, request_id: &str) -> StatusUpdate {
        if !self.success {
            let message = self.message.unwrap_or_else(|| "Generation failed".to_string());
            return StatusUpdate::failed(request_id, message);
        }

        let mut update = StatusUpdate::from_backend(request_id, &self.status, self.image_url);
        if let (Some(message), Some(error)) = (self.message, update.error.as_mut()) {
            *error = message;
        }
        update
    }
}

/// Media entry as the create-post endpoint expects it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemPayload {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl From<&MediaItem> for MediaItemPayload {
    fn from(item: &MediaItem) -> Self {
        Self {
            kind: item.kind,
            url: item.url.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub caption: String,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub category: PostCategory,
    pub image_urls: Vec<String>,
    pub video_urls: Vec<String>,
    pub media_items: Vec<MediaItemPayload>,
    pub ai_generation_ids: Vec<String>,
    pub ai_generated: bool,
    pub ai_details: Option<AiDetails>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

impl From<&PostDraft> for CreatePostRequest {
    fn from(draft: &PostDraft) -> Self {
        let urls_of = |kind: MediaKind| {
            draft
                .media_items
                .iter()
                .filter(|i| i.kind == kind)
                .map(|i| i.url.clone())
                .collect::<Vec<_>>()
        };

        Self {
            caption: draft.caption.clone(),
            post_type: draft.post_type(),
            category: draft.category,
            image_urls: urls_of(MediaKind::Image),
            video_urls: urls_of(MediaKind::Video),
            media_items: draft.media_items.iter().map(MediaItemPayload::from).collect(),
            ai_generation_ids: draft.ai_generation_ids.clone(),
            ai_generated: draft.is_ai_generated(),
            ai_details: draft.ai_details.clone(),
            tags: draft.tags.clone(),
            visibility: draft.visibility,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}
