use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::debug;

use crate::domain::ArtifactKey;
use crate::error::ExtractError;
use crate::policy::CarveOptions;
use crate::store::ArtifactStore;

/// Writes `<root>/<file_id>/<range_id>.<ext>`, creating directories on first use.
pub struct FsArtifactStore {
    root: PathBuf,
    extension: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_options(opts: &CarveOptions) -> Self {
        Self::new(opts.out_dir.clone(), opts.extension.clone())
    }

    pub fn path_for(&self, key: &ArtifactKey) -> PathBuf {
        let name = if self.extension.is_empty() {
            key.range_id.clone()
        } else {
            format!("{}.{}", key.range_id, self.extension)
        };
        self.root.join(&key.file_id).join(name)
    }
}

impl ArtifactStore for FsArtifactStore {
    fn open_append(&self, key: &ArtifactKey) -> Result<Box<dyn Write + '_>, ExtractError> {
        let path = self.path_for(key);
        let output_err = |source| ExtractError::Output {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(output_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(output_err)?;
        debug!("opened artifact {}", path.display());
        Ok(Box::new(BufWriter::new(file)))
    }

    fn locate(&self, key: &ArtifactKey) -> String {
        self.path_for(key).display().to_string()
    }
}
