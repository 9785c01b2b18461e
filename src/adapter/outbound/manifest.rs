//! Multi-document YAML manifest writer.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::domain::route::RoutingArtifacts;
use crate::error::Result;
use crate::port::ArtifactWriter;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// Appends routing artifacts to a manifest file.
///
/// Every document is followed by `---`. The file is created when missing and
/// never truncated, so one manifest can collect several migration steps.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    path: PathBuf,
}

impl ManifestWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize `artifacts` (rule, source, target) into `sink`.
    ///
    /// # Errors
    ///
    /// YAML serialization or I/O errors.
    pub fn write_to<W: Write>(artifacts: &RoutingArtifacts, sink: &mut W) -> Result<()> {
        let mut buffer = String::new();
        push_document(&mut buffer, &artifacts.rule)?;
        if let Some(source) = &artifacts.source {
            push_document(&mut buffer, source)?;
        }
        if let Some(target) = &artifacts.target {
            push_document(&mut buffer, target)?;
        }
        sink.write_all(buffer.as_bytes())?;
        Ok(())
    }
}

impl ArtifactWriter for ManifestWriter {
    fn write(&self, artifacts: &RoutingArtifacts) -> Result<()> {
        // Serialize fully before touching the file so a failure leaves it unchanged.
        let mut buffer = Vec::new();
        Self::write_to(artifacts, &mut buffer)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&buffer)?;
        file.flush()?;

        debug!(path = %self.path.display(), bytes = buffer.len(), "Appended routing manifest");
        Ok(())
    }
}

fn push_document<T: Serialize>(buffer: &mut String, document: &T) -> Result<()> {
    buffer.push_str(&serde_yaml::to_string(document)?);
    buffer.push_str(DOCUMENT_SEPARATOR);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::route::{Percentage, Route};
    use crate::testkit::domain::{cell, owns};

    fn artifacts(percentage: i64) -> RoutingArtifacts {
        let current = cell("checkout-v1", "checkout", "1.0.0");
        let source = cell("portal", "portal", "1.0.0").with_dependencies(&[owns(&current, "checkout")]);
        let new = cell("checkout-v2", "checkout", "2.0.0");
        Route::new(source, current, new)
            .build(Percentage::new(percentage).unwrap(), false)
            .unwrap()
    }

    #[test]
    fn every_document_ends_with_separator() {
        let mut out = Vec::new();
        ManifestWriter::write_to(&artifacts(100), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("---\n"));
        assert_eq!(text.matches("---\n").count(), 3);
        assert!(text.starts_with("apiVersion: networking.istio.io/v1alpha3"));
        assert!(text.contains("kind: VirtualService"));
        assert!(text.contains("name: portal--vs"));
    }

    #[test]
    fn partial_shift_writes_one_document() {
        let mut out = Vec::new();
        ManifestWriter::write_to(&artifacts(30), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().matches("---\n").count(), 1);
    }

    #[test]
    fn appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.yaml");
        std::fs::write(&path, "# existing\n").unwrap();
        let writer = ManifestWriter::new(&path);

        writer.write(&artifacts(30)).unwrap();
        writer.write(&artifacts(30)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# existing\n"));
        assert_eq!(text.matches("name: portal--vs").count(), 2);
    }
}
