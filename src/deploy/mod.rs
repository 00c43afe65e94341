//! Concurrent deploy of the output tree to remote storage.
//!
//! ```text
//!              ┌──────────┐  PutJob   ┌──────────┐
//!  walkdir ──▶ │ producer │ ────────▶ │ worker 1 │ ──┐
//!              │ (compare │  channel  │ worker 2 │ ──┼─▶ done channel ──▶ flush_files
//!              │  prints) │           │ worker W │ ──┘   (W summaries)
//!              └──────────┘           └──────────┘
//! ```
//!
//! The producer walks the local tree depth-first, compares each file's
//! fingerprint with the remote one and enqueues only the ones that differ.
//! Workers start before enumeration and drain the queue concurrently. When
//! the producer is done it closes the queue; each worker then sends one
//! summary on the done channel, and the producer waits for exactly W of
//! them. Only after every upload has finished are remote objects without a
//! local counterpart flushed.
//!
//! Per-file failures never abort the batch: they come back as issues inside
//! the worker summaries.

pub mod bucket;
pub mod driver;

pub use bucket::BucketDriver;
pub use driver::{DriverError, FlushReport, PutOutcome, StorageDriver, open_driver};

use crate::fingerprint::fingerprint;
use crate::report::{DeployReport, Issue};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("output directory not found: {0} (run build first)")]
    MissingOutput(PathBuf),
}

/// One upload, immutable once enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutJob {
    pub local_root: PathBuf,
    /// Slash-separated key relative to `local_root`.
    pub path: String,
    pub force: bool,
}

/// Completion signal of one worker.
#[derive(Debug, Default)]
struct WorkerSummary {
    uploaded: usize,
    unchanged: usize,
    issues: Vec<Issue>,
}

/// Slash-separated key of `path` relative to `root`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Push every changed file under `local_root` through `driver`, then flush
/// remote objects absent from the local tree.
///
/// Only a missing `local_root` is fatal.
pub fn deploy(
    driver: &dyn StorageDriver,
    local_root: &Path,
    workers: usize,
    force: bool,
) -> Result<DeployReport, DeployError> {
    if !local_root.is_dir() {
        return Err(DeployError::MissingOutput(local_root.to_path_buf()));
    }
    let workers = workers.max(1);
    info!(workers, root = %local_root.display(), "deploying");

    let mut report = DeployReport::default();
    let (job_tx, job_rx) = unbounded::<PutJob>();
    let (done_tx, done_rx) = unbounded::<WorkerSummary>();

    let (valid, complete) = thread::scope(|scope| {
        for id in 0..workers {
            let jobs = job_rx.clone();
            let done = done_tx.clone();
            scope.spawn(move || run_worker(id, driver, jobs, done));
        }
        drop(done_tx);

        let enumerated = enqueue(driver, local_root, force, &job_tx, &mut report);
        drop(job_tx);

        for _ in 0..workers {
            let Ok(summary) = done_rx.recv() else { break };
            report.uploaded += summary.uploaded;
            report.skipped += summary.unchanged;
            report.issues.extend(summary.issues);
        }
        enumerated
    });

    if complete {
        match driver.flush_files(&valid) {
            Ok(flushed) => {
                report.deleted += flushed.deleted.len();
                report.issues.extend(flushed.failed);
            }
            Err(e) => {
                error!(error = %e, "remote flush failed");
                report.issues.push(Issue::new("(remote flush)", e));
            }
        }
    } else {
        warn!("local tree not fully listed; remote flush skipped");
        report.issues.push(Issue::new(
            "(remote flush)",
            "skipped because the local tree could not be fully listed",
        ));
    }

    info!(
        scanned = report.scanned,
        uploaded = report.uploaded,
        skipped = report.skipped,
        deleted = report.deleted,
        issues = report.issues.len(),
        "deploy finished"
    );
    Ok(report)
}

/// Walk the tree and enqueue changed files. Returns every key found and
/// whether the listing was complete.
fn enqueue(
    driver: &dyn StorageDriver,
    local_root: &Path,
    force: bool,
    jobs: &Sender<PutJob>,
    report: &mut DeployReport,
) -> (BTreeSet<String>, bool) {
    let mut valid = BTreeSet::new();
    let mut complete = true;

    for entry in WalkDir::new(local_root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot list output entry");
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                report.issues.push(Issue::new(path, e));
                complete = false;
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(key) = relative_key(local_root, entry.path()) else {
            continue;
        };
        report.scanned += 1;
        valid.insert(key.clone());

        let bytes = match std::fs::read(entry.path()) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(path = %key, error = %e, "cannot read local file");
                report.issues.push(Issue::new(key, e));
                continue;
            }
        };
        if !force && driver.remote_fingerprint(&key).as_deref() == Some(fingerprint(&bytes).as_str()) {
            debug!(path = %key, "unchanged remotely");
            report.skipped += 1;
            continue;
        }

        let job = PutJob {
            local_root: local_root.to_path_buf(),
            path: key,
            force,
        };
        if jobs.send(job).is_err() {
            error!("all deploy workers exited early");
            break;
        }
    }
    (valid, complete)
}

fn run_worker(id: usize, driver: &dyn StorageDriver, jobs: Receiver<PutJob>, done: Sender<WorkerSummary>) {
    let mut summary = WorkerSummary::default();
    for job in jobs.iter() {
        match driver.put_file(&job.local_root, &job.path, job.force) {
            Ok(PutOutcome::Uploaded) => {
                info!(worker = id, path = %job.path, "uploaded");
                summary.uploaded += 1;
            }
            Ok(PutOutcome::Unchanged) => {
                debug!(worker = id, path = %job.path, "unchanged remotely");
                summary.unchanged += 1;
            }
            Err(e) => {
                error!(worker = id, path = %job.path, error = %e, "upload failed");
                summary.issues.push(Issue::new(job.path, e));
            }
        }
    }
    let _ = done.send(summary);
}
