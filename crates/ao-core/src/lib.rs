pub mod analyzer;
pub mod collection;
pub mod error;
pub mod generation;
pub mod media;
pub mod post;
pub mod round;
mod model_types;

pub use analyzer::{ContentSuggestion, ContentType, PromptAnalyzer};
pub use collection::MediaCollection;
pub use error::{Error, Result};
pub use generation::{GenerationConfig, GenerationRequest, GenerationSettings, GenerationStatus, Job};
pub use media::{MediaItem, MediaKind, MediaOrigin};
pub use model_types::{AspectRatio, ImageModel};
pub use post::{parse_tags, AiDetails, PostCategory, PostDraft, PostType, Visibility};
pub use round::{PollDecision, RoundSummary, StatusUpdate};

/// Maximum number of images a single Generate action may request.
pub const MAX_IMAGES_PER_JOB: u32 = 4;
