//! Persistence Seam - where healed bundles go

use std::fs;
use std::path::{Path, PathBuf};

use crate::artifacts::{sanitize_component_name, ArtifactBundle};

pub trait ArtifactSink {
    /// Store every present artifact; returns the written locations
    fn persist(&self, component_name: &str, bundle: &ArtifactBundle) -> Result<Vec<PathBuf>, std::io::Error>;
}

/// `<root>/<SanitizedName>/<fileName>`
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn component_dir(&self, component_name: &str) -> PathBuf {
        self.root.join(sanitize_component_name(component_name))
    }
}

impl ArtifactSink for DirectorySink {
    fn persist(&self, component_name: &str, bundle: &ArtifactBundle) -> Result<Vec<PathBuf>, std::io::Error> {
        let dir = self.component_dir(component_name);
        fs::create_dir_all(&dir)?;

        let mut written = vec![];
        for artifact in bundle.present() {
            // Generator-chosen names never escape the component directory
            let file_name = Path::new(&artifact.file_name)
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifact.txt"));
            let path = dir.join(file_name);
            fs::write(&path, &artifact.content)?;
            written.push(path);
        }
        tracing::info!(dir = %dir.display(), files = written.len(), "bundle persisted");
        Ok(written)
    }
}
