use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Post needs a caption or at least one media item")]
    EmptyDraft,

    #[error("Prompt is empty")]
    EmptyPrompt,

    #[error("Image count must be between 1 and {max}, got {count}")]
    InvalidImageCount { count: u32, max: u32 },

    #[error("No media item at index {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unsupported media type for {name}: {mime}")]
    UnsupportedMedia { name: String, mime: String },

    #[error("{name} is {size} bytes, limit is {limit}")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown aspect ratio: {0}")]
    UnknownAspectRatio(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_count_display() {
        let err = Error::InvalidImageCount { count: 7, max: 4 };
        let msg = err.to_string();
        assert!(msg.contains("between 1 and 4"));
        assert!(msg.contains("got 7"));
    }

    #[test]
    fn test_file_too_large_display() {
        let err = Error::FileTooLarge {
            name: "clip.mp4".into(),
            size: 2048,
            limit: 1024,
        };
        assert_eq!(err.to_string(), "clip.mp4 is 2048 bytes, limit is 1024");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
