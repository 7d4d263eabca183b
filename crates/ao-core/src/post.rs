use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::collection::MediaCollection;
use crate::error::{Error, Result};
use crate::media::{MediaItem, MediaOrigin};

/// Maximum number of tags kept on a post
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostCategory {
    TextPost,
    ImageTextPost,
    ImagePost,
    NormalVideo,
    MixedMediaPost,
}

impl PostCategory {
    /// Category from media composition; `None` for a draft with nothing to post.
    pub fn derive(image_count: usize, video_count: usize, caption: &str) -> Option<Self> {
        let has_caption = !caption.trim().is_empty();
        match (image_count > 0, video_count > 0, has_caption) {
            (false, false, false) => None,
            (false, false, true) => Some(Self::TextPost),
            (true, false, true) => Some(Self::ImageTextPost),
            (true, false, false) => Some(Self::ImagePost),
            (false, true, _) => Some(Self::NormalVideo),
            (true, true, _) => Some(Self::MixedMediaPost),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextPost => "text-post",
            Self::ImageTextPost => "image-text-post",
            Self::ImagePost => "image-post",
            Self::NormalVideo => "normal-video",
            Self::MixedMediaPost => "mixed-media-post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Image,
    Video,
    Mixed,
}

impl PostType {
    pub fn derive(image_count: usize, video_count: usize) -> Self {
        match (image_count > 0, video_count > 0) {
            (false, false) => Self::Text,
            (true, false) => Self::Image,
            (false, true) => Self::Video,
            (true, true) => Self::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Followers,
    Private,
}

/// Generation parameters recorded alongside AI media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDetails {
    pub model: String,
    pub prompt: String,
    pub style: String,
    pub aspect_ratio: String,
    pub steps: u32,
}

/// Immutable snapshot of the creation flow at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub caption: String,
    pub media_items: Vec<MediaItem>,
    pub ai_generation_ids: Vec<String>,
    pub ai_details: Option<AiDetails>,
    pub category: PostCategory,
    pub tags: Vec<String>,
    pub visibility: Visibility,
}

impl PostDraft {
    /// Snapshot `media` and the form fields into a draft.
    ///
    /// `generation_ids` maps request ids to backend generation ids; only the
    /// generated items still present in `media` contribute an id. `ai_details`
    /// is dropped when no generated item is left.
    pub fn compose(
        media: &MediaCollection,
        caption: &str,
        generation_ids: &HashMap<String, String>,
        ai_details: Option<AiDetails>,
        tags: Vec<String>,
        visibility: Visibility,
    ) -> Result<Self> {
        let category = PostCategory::derive(media.image_count(), media.video_count(), caption)
            .ok_or(Error::EmptyDraft)?;

        let ai_generation_ids = media
            .iter()
            .filter(|i| i.origin == MediaOrigin::Generated)
            .filter_map(|i| i.source_request_id.as_ref())
            .filter_map(|id| generation_ids.get(id).cloned())
            .collect();
        let has_generated = media.iter().any(|i| i.origin == MediaOrigin::Generated);

        Ok(Self {
            caption: caption.trim().to_string(),
            media_items: media.items().to_vec(),
            ai_generation_ids,
            ai_details: ai_details.filter(|_| has_generated),
            category,
            tags,
            visibility,
        })
    }

    pub fn post_type(&self) -> PostType {
        PostType::derive(self.image_count(), self.video_count())
    }

    pub fn image_count(&self) -> usize {
        self.media_items.iter().filter(|i| i.is_image()).count()
    }

    pub fn video_count(&self) -> usize {
        self.media_items.iter().filter(|i| i.is_video()).count()
    }

    pub fn is_ai_generated(&self) -> bool {
        self.media_items.iter().any(|i| i.origin == MediaOrigin::Generated)
    }
}

/// Split free text like "#sunset, beach  #Sunset" into normalized, unique tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let tag = raw.trim().trim_start_matches('#').to_lowercase();
        if tag.is_empty() || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
        if tags.len() == MAX_TAGS {
            break;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;

    #[test]
    fn test_category_table() {
        assert_eq!(PostCategory::derive(2, 0, "x"), Some(PostCategory::ImageTextPost));
        assert_eq!(PostCategory::derive(2, 0, "  "), Some(PostCategory::ImagePost));
        assert_eq!(PostCategory::derive(0, 0, "hello"), Some(PostCategory::TextPost));
        assert_eq!(PostCategory::derive(0, 3, ""), Some(PostCategory::NormalVideo));
        assert_eq!(PostCategory::derive(0, 3, "caption"), Some(PostCategory::NormalVideo));
        assert_eq!(PostCategory::derive(1, 1, ""), Some(PostCategory::MixedMediaPost));
        assert_eq!(PostCategory::derive(0, 0, ""), None);
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&PostCategory::MixedMediaPost).unwrap();
        assert_eq!(json, "\"mixed-media-post\"");
        assert_eq!(PostCategory::NormalVideo.as_str(), "normal-video");
    }

    #[test]
    fn test_empty_draft_rejected() {
        let media = MediaCollection::new();
        let err = PostDraft::compose(&media, "   ", &HashMap::new(), None, vec![], Visibility::Public);
        assert_eq!(err, Err(Error::EmptyDraft));
    }

    #[test]
    fn test_compose_collects_generation_ids_in_collection_order() {
        let mut media = MediaCollection::new();
        media.append(vec![
            MediaItem::generated("b", "req-b"),
            MediaItem::uploaded(MediaKind::Image, "data:image/png;base64,AA==".into()),
            MediaItem::generated("a", "req-a"),
        ]);
        let ids = HashMap::from([
            ("req-a".to_string(), "gen-a".to_string()),
            ("req-b".to_string(), "gen-b".to_string()),
            ("req-gone".to_string(), "gen-gone".to_string()),
        ]);

        let draft = PostDraft::compose(&media, "", &ids, None, vec![], Visibility::Public).unwrap();

        assert_eq!(draft.ai_generation_ids, vec!["gen-b", "gen-a"]);
        assert_eq!(draft.category, PostCategory::ImagePost);
        assert_eq!(draft.post_type(), PostType::Image);
        assert!(draft.is_ai_generated());
    }

    #[test]
    fn test_text_only_draft() {
        let media = MediaCollection::new();
        let draft = PostDraft::compose(&media, " just words ", &HashMap::new(), None, vec![], Visibility::Private).unwrap();
        assert_eq!(draft.caption, "just words");
        assert_eq!(draft.post_type(), PostType::Text);
        assert!(!draft.is_ai_generated());
    }

    #[test]
    fn test_ai_details_need_generated_media() {
        let details = AiDetails {
            model: "flux-dev".into(),
            prompt: "a red fox".into(),
            style: "realistic".into(),
            aspect_ratio: "1:1".into(),
            steps: 28,
        };
        let mut media = MediaCollection::new();
        media.append(vec![MediaItem::uploaded(MediaKind::Image, "data:image/png;base64,AA==".into())]);

        let draft = PostDraft::compose(&media, "", &HashMap::new(), Some(details.clone()), vec![], Visibility::Public).unwrap();
        assert!(draft.ai_details.is_none());

        media.append(vec![MediaItem::generated("https://cdn/fox.png", "req-0")]);
        let draft = PostDraft::compose(&media, "", &HashMap::new(), Some(details.clone()), vec![], Visibility::Public).unwrap();
        assert_eq!(draft.ai_details, Some(details));
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(parse_tags("#Sunset, beach  #sunset,,#"), vec!["sunset", "beach"]);
        assert!(parse_tags("   ").is_empty());

        let many: String = (0..20).map(|i| format!("t{i} ")).collect();
        assert_eq!(parse_tags(&many).len(), MAX_TAGS);
    }
}
