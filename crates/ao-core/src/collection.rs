//! Ordered, url-deduplicated set of media attached to a draft post.

use std::collections::HashSet;
use tracing::debug;
use crate::error::{Error, Result};
use crate::media::{MediaItem, MediaKind};

/// Insertion order is the grid order of the post; no two items share a url.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaCollection {
    items: Vec<MediaItem>,
}

impl MediaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the items whose url is not present yet, keeping their relative order.
    ///
    /// Duplicates inside `incoming` are collapsed as well, so calling this
    /// repeatedly with overlapping input never grows the collection twice.
    /// Returns the number of items actually added.
    pub fn append<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = MediaItem>,
    {
        let mut seen: HashSet<String> = self.items.iter().map(|i| i.url.clone()).collect();
        let before = self.items.len();

        for item in incoming {
            if seen.insert(item.url.clone()) {
                self.items.push(item);
            } else {
                debug!(url = %item.url, "skipping media already in collection");
            }
        }

        self.items.len() - before
    }

    pub fn remove(&mut self, index: usize) -> Result<MediaItem> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange { index, len: self.items.len() });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MediaItem> {
        self.items.iter()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|i| i.url == url)
    }

    pub fn image_count(&self) -> usize {
        self.count_kind(MediaKind::Image)
    }

    pub fn video_count(&self) -> usize {
        self.count_kind(MediaKind::Video)
    }

    pub fn image_urls(&self) -> Vec<String> {
        self.urls_of(MediaKind::Image)
    }

    pub fn video_urls(&self) -> Vec<String> {
        self.urls_of(MediaKind::Video)
    }

    fn count_kind(&self, kind: MediaKind) -> usize {
        self.items.iter().filter(|i| i.kind == kind).count()
    }

    fn urls_of(&self, kind: MediaKind) -> Vec<String> {
        self.items
            .iter()
            .filter(|i| i.kind == kind)
            .map(|i| i.url.clone())
            .collect()
    }
}

impl<'a> IntoIterator for &'a MediaCollection {
    type Item = &'a MediaItem;
    type IntoIter = std::slice::Iter<'a, MediaItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
