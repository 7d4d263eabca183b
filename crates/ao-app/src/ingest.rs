//! Local file uploads turned into self-contained media items.

use std::path::{Path, PathBuf};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;
use ao_core::{Error as CoreError, MediaItem, MediaKind};
use crate::error::AppError;

/// A file picked by the user, with the MIME type it was declared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }
}

pub struct UploadIngestor {
    max_bytes: u64,
}

impl UploadIngestor {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Convert a whole selection. Nothing is returned unless every file is usable.
    pub fn ingest(&self, files: &[SelectedFile]) -> Result<Vec<MediaItem>, AppError> {
        files.iter().map(|file| self.ingest_one(file)).collect()
    }

    /// Read `paths` from disk (type guessed from the extension), then ingest them as one batch.
    pub async fn read_paths(&self, paths: &[PathBuf]) -> Result<Vec<MediaItem>, AppError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.read_file(path).await?);
        }
        self.ingest(&files)
    }

    async fn read_file(&self, path: &Path) -> Result<SelectedFile, AppError> {
        let io_err = |source| AppError::Io { path: path.to_path_buf(), source };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
        self.check_size(&name, size)?;

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        let mime = mime_guess::from_path(path).first_or_octet_stream().to_string();

        Ok(SelectedFile { name, mime, bytes })
    }

    fn ingest_one(&self, file: &SelectedFile) -> Result<MediaItem, AppError> {
        let kind = MediaKind::from_mime(&file.mime).ok_or_else(|| CoreError::UnsupportedMedia {
            name: file.name.clone(),
            mime: file.mime.clone(),
        })?;
        self.check_size(&file.name, file.bytes.len() as u64)?;

        debug!(name = %file.name, mime = %file.mime, size = file.bytes.len(), "ingesting upload");
        Ok(MediaItem::uploaded(kind, data_url(&file.mime, &file.bytes)))
    }

    fn check_size(&self, name: &str, size: u64) -> Result<(), AppError> {
        if size > self.max_bytes {
            return Err(CoreError::FileTooLarge {
                name: name.to_string(),
                size,
                limit: self.max_bytes,
            }
            .into());
        }
        Ok(())
    }
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
