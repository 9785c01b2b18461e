//! Local image repository reader.
//!
//! Images live extracted at `<root>/<org>/<name>/<version>/`, with their
//! dependency metadata in `artifacts/metadata.json`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::image::{ImageMetadata, ImageReference};
use crate::error::{Error, Result};
use crate::port::{ImageMetadataReader, ResolvedImage};

const METADATA_FILE: &str = "artifacts/metadata.json";

#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory an image is extracted to.
    #[must_use]
    pub fn image_dir(&self, reference: &ImageReference) -> PathBuf {
        self.root
            .join(reference.organization())
            .join(reference.name())
            .join(reference.version())
    }
}

#[async_trait]
impl ImageMetadataReader for LocalRepository {
    async fn read(&self, reference: &ImageReference) -> Result<ResolvedImage> {
        let image_dir = self.image_dir(reference);
        let path = image_dir.join(METADATA_FILE);
        let unavailable = |reason: String| Error::ImageMetadataUnavailable {
            image: reference.to_string(),
            reason,
        };

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| unavailable(format!("{}: {e}", path.display())))?;
        let metadata: ImageMetadata =
            serde_json::from_str(&raw).map_err(|e| unavailable(format!("{}: {e}", path.display())))?;

        if metadata.identity() != reference.identity() {
            return Err(unavailable(format!(
                "metadata describes {} instead",
                metadata.identity()
            )));
        }

        debug!(image = %reference, dependencies = metadata.dependencies.len(), "Read image metadata");
        Ok(ResolvedImage {
            reference: reference.clone(),
            metadata,
            image_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_metadata(root: &Path, org: &str, name: &str, version: &str, json: &str) {
        let dir = root.join(org).join(name).join(version).join("artifacts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("metadata.json"), json).unwrap();
    }

    #[tokio::test]
    async fn reads_nested_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_metadata(
            dir.path(),
            "org",
            "hr",
            "1.0.0",
            r#"{
                "org": "org", "name": "hr", "version": "1.0.0",
                "components": ["hr"],
                "dependencies": {
                    "employee": {"org": "org", "name": "employee", "version": "1.0.0",
                                 "components": ["employee"], "dependencies": {}}
                }
            }"#,
        );
        let repository = LocalRepository::new(dir.path());
        let reference = ImageReference::parse("org/hr:1.0.0").unwrap();

        let resolved = repository.read(&reference).await.unwrap();

        assert_eq!(resolved.image_dir, dir.path().join("org/hr/1.0.0"));
        assert_eq!(resolved.metadata.dependencies.len(), 1);
    }

    #[tokio::test]
    async fn missing_image_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let repository = LocalRepository::new(dir.path());
        let reference = ImageReference::parse("org/ghost:1.0.0").unwrap();

        let err = repository.read(&reference).await.unwrap_err();
        assert!(matches!(err, Error::ImageMetadataUnavailable { .. }));
    }

    #[tokio::test]
    async fn mismatched_metadata_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write_metadata(
            dir.path(),
            "org",
            "hr",
            "1.0.0",
            r#"{"org": "org", "name": "payroll", "version": "1.0.0", "components": [], "dependencies": {}}"#,
        );
        let repository = LocalRepository::new(dir.path());
        let reference = ImageReference::parse("org/hr:1.0.0").unwrap();

        assert!(repository.read(&reference).await.is_err());
    }
}
