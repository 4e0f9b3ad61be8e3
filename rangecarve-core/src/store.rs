// rangecarve_core/src/store.rs
use crate::domain::ArtifactKey;
use crate::error::ExtractError;
use std::io::Write;

/// Destination for reassembled artifacts.
///
/// Every handle is append-only: reopening the same key continues the file
/// instead of truncating it.
pub trait ArtifactStore {
    fn open_append(&self, key: &ArtifactKey) -> Result<Box<dyn Write + '_>, ExtractError>;

    /// Human-readable location of `key`, used in logs and errors.
    fn locate(&self, key: &ArtifactKey) -> String;
}
