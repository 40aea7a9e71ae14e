//! Request-scoped scratch files
//!
//! Each request gets uniquely named scratch paths so concurrent requests
//! never collide. The guard removes the file on drop, which makes cleanup
//! unconditional on every exit path of the pipeline.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// A scratch file path owned by one request.
///
/// The path is reserved at construction; the external tool writing to it
/// creates the actual file. Whatever exists at the path when the guard drops
/// is removed.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Reserve a unique scratch path in `dir` with the given extension.
    pub fn new(dir: &Path, extension: &str) -> Self {
        let path = dir.join(format!("dialect_{}.{extension}", Uuid::new_v4()));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.path.exists() {
            match std::fs::remove_file(&self.path) {
                Ok(()) => debug!("Removed scratch file {}", self.path.display()),
                Err(e) => warn!("Failed to remove scratch file {}: {e}", self.path.display()),
            }
        }
    }
}
