use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a declared MIME type; anything other than image/* or video/* is rejected.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_ascii_lowercase();
        match top.as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Where a media item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaOrigin {
    Generated,
    Uploaded,
    Prefilled,
}

/// One image or video attached to the draft post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub origin: MediaOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_request_id: Option<String>,
}

impl MediaItem {
    pub fn generated(url: impl Into<String>, request_id: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            kind: MediaKind::Image,
            thumbnail_url: Some(url.clone()),
            url,
            origin: MediaOrigin::Generated,
            source_request_id: Some(request_id.into()),
        }
    }

    pub fn uploaded(kind: MediaKind, data_url: String) -> Self {
        Self {
            kind,
            thumbnail_url: Some(data_url.clone()),
            url: data_url,
            origin: MediaOrigin::Uploaded,
            source_request_id: None,
        }
    }

    /// Media already attached when the flow opens, e.g. when re-posting.
    pub fn prefilled(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            thumbnail_url: None,
            origin: MediaOrigin::Prefilled,
            source_request_id: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}
