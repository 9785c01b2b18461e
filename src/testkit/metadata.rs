//! In-memory image metadata reader.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::{ImageIdentity, ImageMetadata, ImageReference};
use crate::error::{Error, Result};
use crate::port::{ImageMetadataReader, ResolvedImage};

/// Reader serving metadata registered up front, keyed by image identity.
///
/// Nested dependency metadata is registered too, so a root image is enough
/// to serve its whole tree.
#[derive(Default)]
pub struct StaticMetadataReader {
    images: BTreeMap<ImageIdentity, ImageMetadata>,
    reads: AtomicUsize,
}

impl StaticMetadataReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `metadata` and every image it depends on.
    #[must_use]
    pub fn with_image(mut self, metadata: ImageMetadata) -> Self {
        for dep in metadata.dependencies.values() {
            self = self.with_image(dep.clone());
        }
        self.images.insert(metadata.identity(), metadata);
        self
    }

    /// Drop an image, so that reading it fails.
    #[must_use]
    pub fn without(mut self, identity: &ImageIdentity) -> Self {
        self.images.remove(identity);
        self
    }

    /// Number of reads served or refused.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageMetadataReader for StaticMetadataReader {
    async fn read(&self, reference: &ImageReference) -> Result<ResolvedImage> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let identity = reference.identity();
        let metadata = self
            .images
            .get(&identity)
            .cloned()
            .ok_or_else(|| Error::ImageMetadataUnavailable {
                image: reference.to_string(),
                reason: "image not found in repository".to_string(),
            })?;
        Ok(ResolvedImage {
            reference: reference.clone(),
            metadata,
            image_dir: PathBuf::from(format!(
                "/images/{}/{}/{}",
                identity.organization, identity.name, identity.version
            )),
        })
    }
}
