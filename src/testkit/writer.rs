//! In-memory artifact writer.

use parking_lot::Mutex;

use crate::domain::route::RoutingArtifacts;
use crate::error::{Error, Result};
use crate::port::ArtifactWriter;

/// Writer that keeps every batch of artifacts it is given.
#[derive(Default)]
pub struct MemoryWriter {
    written: Mutex<Vec<RoutingArtifacts>>,
    fail: bool,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer whose every write fails with an I/O error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<RoutingArtifacts> {
        self.written.lock().clone()
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&self, artifacts: &RoutingArtifacts) -> Result<()> {
        if self.fail {
            return Err(Error::Io(std::io::Error::other("manifest is read-only")));
        }
        self.written.lock().push(artifacts.clone());
        Ok(())
    }
}
