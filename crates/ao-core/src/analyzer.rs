//! Keyword heuristics that suggest a content type for a free-text prompt

use serde::{Deserialize, Serialize};
use crate::model_types::ImageModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Text,
}

/// Motion and time terms
const VIDEO_TERMS: &[&str] = &[
    "video", "clip", "animate", "animated", "animation", "motion", "moving", "move", "running",
    "flying", "dancing", "walking", "spinning", "timelapse", "time-lapse", "footage", "scene",
    "cinematic", "pan", "zoom", "flowing",
];

const VIDEO_PHRASES: &[&str] = &["slow motion", "time lapse", "camera pans", "tracking shot"];

const TEXT_TERMS: &[&str] = &[
    "write", "poem", "story", "essay", "quote", "caption", "article", "haiku", "thread", "joke",
    "lyrics", "summary", "tweet",
];

const IMAGE_TERMS: &[&str] = &[
    "image", "photo", "photograph", "picture", "portrait", "painting", "illustration", "drawing",
    "sketch", "render", "landscape", "poster", "logo", "wallpaper", "watercolor", "photorealistic",
];

/// Terms that push an image suggestion towards the slower, more detailed model
const DETAIL_TERMS: &[&str] = &["photorealistic", "detailed", "hyperrealistic", "8k", "intricate"];

/// Motion is a stronger signal than the generic visual vocabulary
const VIDEO_WEIGHT: f32 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum trimmed prompt length before analysis runs
    pub min_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { min_chars: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSuggestion {
    pub content_type: ContentType,
    /// 0.0 - 1.0
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
    pub suggested_model: Option<ImageModel>,
}

#[derive(Debug, Clone, Default)]
pub struct PromptAnalyzer {
    config: AnalyzerConfig,
}

impl PromptAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn min_chars(&self) -> usize {
        self.config.min_chars
    }

    /// Suggest a content type, or `None` when the prompt is too short to judge.
    pub fn analyze(&self, prompt: &str) -> Option<ContentSuggestion> {
        let prompt = prompt.trim();
        if prompt.chars().count() < self.config.min_chars {
            return None;
        }

        let lower = prompt.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();

        let mut video = matches(&words, VIDEO_TERMS);
        video.extend(VIDEO_PHRASES.iter().filter(|p| lower.contains(*p)).map(|p| p.to_string()));
        let text = matches(&words, TEXT_TERMS);
        let image = matches(&words, IMAGE_TERMS);

        let scores = [
            (ContentType::Video, video.len() as f32 * VIDEO_WEIGHT, video),
            (ContentType::Text, text.len() as f32, text),
            (ContentType::Image, image.len() as f32, image),
        ];
        let total: f32 = scores.iter().map(|(_, s, _)| s).sum();

        if total == 0.0 {
            return Some(ContentSuggestion {
                content_type: ContentType::Image,
                confidence: 0.3,
                matched_keywords: Vec::new(),
                suggested_model: Some(suggest_model(&words)),
            });
        }

        // Ties resolve in array order: video, text, image
        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        let (content_type, score, keywords) = best;

        let strength = (0.55 + 0.15 * (keywords.len() as f32 - 1.0)).min(0.95);
        let confidence = (strength * (score / total)).clamp(0.0, 1.0);

        Some(ContentSuggestion {
            content_type: *content_type,
            confidence,
            matched_keywords: keywords.clone(),
            suggested_model: (*content_type == ContentType::Image).then(|| suggest_model(&words)),
        })
    }
}

fn matches(words: &[&str], terms: &[&str]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for word in words {
        if terms.contains(word) && !found.iter().any(|f| f == word) {
            found.push(word.to_string());
        }
    }
    found
}

fn suggest_model(words: &[&str]) -> ImageModel {
    if words.iter().any(|w| DETAIL_TERMS.contains(w)) {
        ImageModel::FluxDev
    } else {
        ImageModel::FluxSchnell
    }
}
