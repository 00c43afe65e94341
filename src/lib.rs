//! # Filmstrip
//!
//! Builds a hierarchical photo-gallery site from a directory tree and keeps
//! an object-store bucket in sync with it. The filesystem is the data source:
//! directories become collections, JPEG files become photos, and a small
//! naming convention in file names controls order, titles, and covers.
//!
//! # Architecture: Two Phases
//!
//! ```text
//! 1. Build    content/  →  public/   (walk, cut variants, render pages, flush stale output)
//! 2. Deploy   public/   →  bucket    (upload changed files, delete orphaned objects)
//! ```
//!
//! Both phases are incremental and idempotent. Build compares the SHA-256
//! fingerprint of each source image with its copy in the output tree and
//! only recuts what changed; every page is written only when its bytes
//! differ. Deploy compares local fingerprints with the ones recorded on the
//! remote objects and only uploads what differs. Running either phase twice
//! in a row does nothing the second time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | Build entry point: scaffold (stylesheet, about page), navigation, then the walk |
//! | [`collection`] | Recursive collection walker: items, sort order, covers, page rendering |
//! | [`naming`] | `*_N_Title` file name decoder and slug sanitizer |
//! | [`imaging`] | Variant cutting behind the `ImageBackend` trait |
//! | [`metadata`] | EXIF reading: date, camera summary, copyright, caption |
//! | [`render`] | Maud templates for gallery, cover, detail, and about pages |
//! | [`flush`] | Output reconciler: removes files and directories no longer produced |
//! | [`fingerprint`] | Content fingerprints and write-if-changed |
//! | [`deploy`] | Concurrent upload scheduler and the storage drivers |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`report`] | Per-phase reports carrying recoverable issues |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Output Is Reconciled, Not Cleaned
//!
//! There is no "clean" step. After a collection is rendered, every file in
//! its output directory that no valid item slug accounts for is removed, and
//! so is every subdirectory that no child collection claims. Renaming or
//! deleting a photo in the source removes its variants and page on the next
//! build without touching anything else.
//!
//! ## Fingerprints on the Remote Object
//!
//! S3 ETags are not content hashes for multipart uploads, so each upload
//! carries its SHA-256 fingerprint as user metadata. A HEAD request is all a
//! skip decision costs.
//!
//! ## Failures Are Reported, Not Fatal
//!
//! Only a missing source tree, a broken config, or an unusable storage
//! driver stop a run. A corrupt photo, an unreadable EXIF block, or a
//! rejected upload is logged through `tracing` and recorded as an issue in
//! the phase report; the rest of the site still builds and deploys.

pub mod collection;
pub mod config;
pub mod deploy;
pub mod fingerprint;
pub mod flush;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod render;
pub mod report;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;
