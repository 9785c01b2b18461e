//! Image metadata port.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::image::{ImageMetadata, ImageReference};
use crate::error::Result;

/// An image whose metadata has been read.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub reference: ImageReference,
    pub metadata: ImageMetadata,
    /// Location of the extracted image contents.
    pub image_dir: PathBuf,
}

/// Resolves image references to the metadata packaged in the image.
#[async_trait]
pub trait ImageMetadataReader: Send + Sync {
    /// Read the declared components and dependencies of `reference`.
    ///
    /// Fails with [`Error::ImageMetadataUnavailable`](crate::error::Error::ImageMetadataUnavailable)
    /// when the image is missing or its metadata does not parse.
    async fn read(&self, reference: &ImageReference) -> Result<ResolvedImage>;
}
