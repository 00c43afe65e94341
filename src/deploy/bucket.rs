//! Object-store backed [`StorageDriver`].
//!
//! Works with any [`ObjectStore`]; [`BucketDriver::s3`] builds the S3 one
//! from the environment (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, …)
//! plus the `[storage]` config section. Tests use the in-memory store.
//!
//! S3 ETags are MD5-based (and not even that for multipart uploads), so the
//! SHA-256 fingerprint of each upload is stored as user metadata
//! (`x-amz-meta-fingerprint`) and read back with a HEAD request.
//!
//! The store API is async; the driver owns a small tokio runtime and blocks
//! on it, so deploy workers stay plain threads.

use super::driver::{DriverError, FlushReport, PutOutcome, StorageDriver, cache_control, content_type};
use crate::config::StorageConfig;
use crate::fingerprint::fingerprint;
use crate::report::Issue;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectMeta, ObjectStore, PutOptions,
    PutPayload,
};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

/// User-metadata key holding the content fingerprint.
const FINGERPRINT_KEY: &str = "fingerprint";

pub struct BucketDriver {
    store: Arc<dyn ObjectStore>,
    runtime: Runtime,
    asset_max_age: u64,
}

impl BucketDriver {
    pub fn new(store: Arc<dyn ObjectStore>, asset_max_age: u64) -> Result<Self, DriverError> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("filmstrip-store")
            .enable_all()
            .build()?;
        Ok(Self {
            store,
            runtime,
            asset_max_age,
        })
    }

    /// S3 (or S3-compatible) bucket from `config` and the environment.
    pub fn s3(config: &StorageConfig) -> Result<Self, DriverError> {
        if config.bucket.trim().is_empty() {
            return Err(DriverError::MissingBucket);
        }
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(&config.bucket);
        if !config.region.is_empty() {
            builder = builder.with_region(&config.region);
        }
        if !config.endpoint.is_empty() {
            builder = builder.with_endpoint(&config.endpoint);
        }
        Self::new(Arc::new(builder.build()?), config.asset_max_age)
    }

    fn fingerprint_attribute() -> Attribute {
        Attribute::Metadata(Cow::Borrowed(FINGERPRINT_KEY))
    }
}

impl StorageDriver for BucketDriver {
    fn remote_fingerprint(&self, path: &str) -> Option<String> {
        let location = ObjectPath::from(path);
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        match self.runtime.block_on(self.store.get_opts(&location, options)) {
            Ok(result) => result
                .attributes
                .get(&Self::fingerprint_attribute())
                .map(|value| AsRef::<str>::as_ref(value).to_string()),
            Err(object_store::Error::NotFound { .. }) => None,
            Err(e) => {
                debug!(path, error = %e, "remote lookup failed; treating as changed");
                None
            }
        }
    }

    fn put_file(&self, local_root: &Path, path: &str, force: bool) -> Result<PutOutcome, DriverError> {
        let bytes = std::fs::read(local_root.join(path))?;
        let local = fingerprint(&bytes);
        if !force && self.remote_fingerprint(path).as_deref() == Some(local.as_str()) {
            return Ok(PutOutcome::Unchanged);
        }

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, AttributeValue::from(content_type(path)));
        attributes.insert(
            Attribute::CacheControl,
            AttributeValue::from(cache_control(path, self.asset_max_age)),
        );
        attributes.insert(Self::fingerprint_attribute(), AttributeValue::from(local));
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let location = ObjectPath::from(path);
        self.runtime
            .block_on(self.store.put_opts(&location, PutPayload::from(bytes), options))?;
        Ok(PutOutcome::Uploaded)
    }

    fn flush_files(&self, valid_paths: &BTreeSet<String>) -> Result<FlushReport, DriverError> {
        let objects: Vec<ObjectMeta> = self
            .runtime
            .block_on(self.store.list(None).try_collect::<Vec<ObjectMeta>>())?;

        let mut report = FlushReport::default();
        for object in objects {
            let key = object.location.to_string();
            if valid_paths.contains(&key) {
                continue;
            }
            match self.runtime.block_on(self.store.delete(&object.location)) {
                Ok(()) => {
                    info!(key = %key, "deleted remote object");
                    report.deleted.push(key);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "failed to delete remote object");
                    report.failed.push(Issue::new(key, e));
                }
            }
        }
        Ok(report)
    }
}
