//! Revocable handles to in-memory image data
//!
//! A `HandleStore` owns the bytes behind every live handle. An `ImageHandle`
//! is an opaque ticket into the store; it cannot be cloned, so whoever holds
//! it is responsible for handing it back through [`HandleStore::revoke`].
//! Bytes stay alive until that happens, which makes a forgotten handle show
//! up in [`HandleStore::live_count`] instead of silently leaking.

use crate::error::{Result, StudioError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// URL scheme prefix used for handle sources
pub const HANDLE_URL_PREFIX: &str = "blob:bgremove-studio/";

/// Opaque reference to image bytes held in a [`HandleStore`]
#[derive(Debug, PartialEq, Eq)]
pub struct ImageHandle {
    id: Uuid,
    mime: String,
    size: usize,
}

impl ImageHandle {
    /// Displayable URL for this handle
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}{}", HANDLE_URL_PREFIX, self.id)
    }

    /// MIME type of the referenced data
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Size of the referenced data in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A resolved handle: everything needed to display or export the image
#[derive(Debug, Clone, Serialize)]
pub struct ImageSource {
    pub url: String,
    pub mime: String,
    #[serde(skip)]
    pub data: Arc<[u8]>,
}

impl ImageSource {
    /// Size of the data in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug)]
struct Entry {
    mime: String,
    data: Arc<[u8]>,
}

/// Owner of all live image data for one session
#[derive(Debug, Default)]
pub struct HandleStore {
    entries: HashMap<Uuid, Entry>,
}

impl HandleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register image data and return a handle to it
    pub fn create<S: Into<String>>(&mut self, data: Arc<[u8]>, mime: S) -> ImageHandle {
        let id = Uuid::new_v4();
        let mime = mime.into();
        let size = data.len();
        debug!(handle = %id, mime = %mime, size_bytes = size, "Created image handle");
        self.entries.insert(
            id,
            Entry {
                mime: mime.clone(),
                data,
            },
        );
        ImageHandle { id, mime, size }
    }

    /// Resolve a handle to its source
    pub fn resolve(&self, handle: &ImageHandle) -> Result<ImageSource> {
        self.entries
            .get(&handle.id)
            .map(|entry| ImageSource {
                url: handle.url(),
                mime: entry.mime.clone(),
                data: Arc::clone(&entry.data),
            })
            .ok_or_else(|| StudioError::handle(format!("{} is not live", handle.url())))
    }

    /// Release the data behind a handle.
    ///
    /// Returns `false` if the handle did not belong to this store.
    pub fn revoke(&mut self, handle: ImageHandle) -> bool {
        let released = self.entries.remove(&handle.id).is_some();
        debug!(handle = %handle.id, released, "Revoked image handle");
        released
    }

    /// Whether the handle is still live in this store
    #[must_use]
    pub fn contains(&self, handle: &ImageHandle) -> bool {
        self.entries.contains_key(&handle.id)
    }

    /// Number of live handles
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.len()
    }

    /// Total bytes held by live handles
    #[must_use]
    pub fn live_bytes(&self) -> usize {
        self.entries.values().map(|entry| entry.data.len()).sum()
    }

    /// Release every live handle, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
