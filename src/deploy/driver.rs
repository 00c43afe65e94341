//! Remote storage abstraction.
//!
//! A [`StorageDriver`] stores files under slash-separated keys relative to
//! the site root (`travel/japan/index.html`) and knows the fingerprint of
//! each stored object. Both mutating operations are idempotent: putting an
//! unchanged file is a no-op, and flushing twice with the same valid set
//! deletes nothing the second time.

use crate::config::StorageConfig;
use crate::report::Issue;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use super::bucket::BucketDriver;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("unknown storage driver '{0}'")]
    UnknownDriver(String),
    #[error("storage.bucket is not set")]
    MissingBucket,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object store error: {0}")]
    Store(#[from] object_store::Error),
}

/// Result of a single [`StorageDriver::put_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Uploaded,
    /// The remote object already had the local fingerprint.
    Unchanged,
}

/// Result of [`StorageDriver::flush_files`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub deleted: Vec<String>,
    /// Keys that could not be deleted.
    pub failed: Vec<Issue>,
}

/// A remote store the site is deployed to.
pub trait StorageDriver: Send + Sync {
    /// Fingerprint recorded with the object at `path`.
    ///
    /// Best effort: `None` for a missing object and for any failure, which
    /// callers treat as "differs".
    fn remote_fingerprint(&self, path: &str) -> Option<String>;

    /// Upload `local_root/path` to `path`, unless `force` is off and the
    /// remote fingerprint already matches.
    fn put_file(&self, local_root: &Path, path: &str, force: bool) -> Result<PutOutcome, DriverError>;

    /// Delete every remote object whose key is not in `valid_paths`.
    fn flush_files(&self, valid_paths: &BTreeSet<String>) -> Result<FlushReport, DriverError>;
}

/// Build the driver named by `config.driver`.
pub fn open_driver(config: &StorageConfig) -> Result<Box<dyn StorageDriver>, DriverError> {
    match config.driver.as_str() {
        "s3" => Ok(Box::new(BucketDriver::s3(config)?)),
        other => Err(DriverError::UnknownDriver(other.to_string())),
    }
}

/// `Content-Type` for a key, from its extension.
pub fn content_type(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "txt" => "text/plain; charset=utf-8",
        "json" => "application/json",
        "xml" => "application/xml",
        _ => "application/octet-stream",
    }
}

/// `Cache-Control` for a key: pages always revalidate, assets are cached.
pub fn cache_control(path: &str, asset_max_age: u64) -> String {
    if content_type(path).starts_with("text/html") {
        "max-age=0".to_string()
    } else {
        format!("max-age={asset_max_age}")
    }
}
