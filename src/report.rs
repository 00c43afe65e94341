//! Per-phase results returned to the caller.
//!
//! Recoverable per-item failures (a corrupt EXIF block, a failed cut, a
//! rejected upload) never abort a phase. Each one is logged where it happens
//! and recorded here as an [`Issue`], so the CLI can summarize them and tests
//! can assert on them.

use std::fmt;

/// A recoverable failure tied to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of `site::build`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub collections: usize,
    pub items: usize,
    /// Items whose variants were (re)cut.
    pub cut: usize,
    /// Items left untouched because their output original matched.
    pub unchanged: usize,
    /// Pages and assets whose bytes changed on disk.
    pub pages_written: usize,
    /// Stale files and directories removed from the output tree.
    pub removed: usize,
    pub issues: Vec<Issue>,
}

/// Outcome of `deploy::deploy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Files found in the local output tree.
    pub scanned: usize,
    /// Files whose remote fingerprint already matched.
    pub skipped: usize,
    pub uploaded: usize,
    /// Remote objects removed because no local file backs them.
    pub deleted: usize,
    pub issues: Vec<Issue>,
}

impl DeployReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
