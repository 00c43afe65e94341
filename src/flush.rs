//! Orphan removal for the local output tree.
//!
//! After a collection is built, every file in its output directory must be
//! backed by a live source. Files are matched against a [`ValidFileSet`] of
//! base names: a file survives when its name equals a member or starts with
//! one, so the set entry `sunset` keeps `sunset.jpg`, `sunset_2.jpg` and
//! `sunset.html` alike.
//!
//! Directories are swept separately by [`flush_dirs`], which matches names
//! exactly against the child collections (and scaffold directories) that
//! are expected to exist.

use crate::report::Issue;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Base names that keep their matching files alive in one directory.
pub type ValidFileSet = BTreeSet<String>;

/// How far [`flush_invalid`] reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlushMode {
    /// Only files directly inside the directory. Subdirectories belong to
    /// child collections, which flush themselves.
    #[default]
    PerLevel,
    /// Apply the same set to every file of the whole subtree.
    Recursive,
}

/// What a flush removed and what it failed to remove.
#[derive(Debug, Default)]
pub struct FlushOutcome {
    pub removed: Vec<PathBuf>,
    pub issues: Vec<Issue>,
}

impl FlushOutcome {
    pub fn absorb(&mut self, other: FlushOutcome) {
        self.removed.extend(other.removed);
        self.issues.extend(other.issues);
    }
}

/// `true` when `name` equals a member of `valid` or starts with one.
pub fn is_valid(name: &str, valid: &ValidFileSet) -> bool {
    valid.contains(name) || valid.iter().any(|key| name.starts_with(key.as_str()))
}

/// Remove every file in `dir` that no member of `valid` accounts for.
///
/// A missing directory is a no-op.
pub fn flush_invalid(dir: &Path, valid: &ValidFileSet, mode: FlushMode) -> FlushOutcome {
    let mut outcome = FlushOutcome::default();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return outcome;
    };

    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            if mode == FlushMode::Recursive {
                outcome.absorb(flush_invalid(&path, valid, mode));
            }
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if is_valid(&name, valid) {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed stale file");
                outcome.removed.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove stale file");
                outcome
                    .issues
                    .push(Issue::new(path.display().to_string(), e));
            }
        }
    }
    outcome
}

/// Remove every subdirectory of `parent` whose name is not in `allowed`.
pub fn flush_dirs(parent: &Path, allowed: &BTreeSet<String>) -> FlushOutcome {
    let mut outcome = FlushOutcome::default();
    let Ok(entries) = std::fs::read_dir(parent) else {
        return outcome;
    };

    let mut entries: Vec<_> = entries.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if allowed.contains(&name) {
            continue;
        }
        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed stale directory");
                outcome.removed.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove stale directory");
                outcome
                    .issues
                    .push(Issue::new(path.display().to_string(), e));
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::file_names;
    use std::fs;
    use tempfile::TempDir;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn removes_only_orphans() {
        let tmp = TempDir::new().unwrap();
        for name in ["sunset.jpg", "sunset_2.jpg", "harbor.html", "boat.jpg"] {
            touch(&tmp.path().join(name));
        }

        let outcome = flush_invalid(tmp.path(), &set(&["sunset", "harbor"]), FlushMode::PerLevel);

        assert_eq!(outcome.removed, vec![tmp.path().join("boat.jpg")]);
        assert!(outcome.issues.is_empty());
        assert_eq!(
            file_names(tmp.path()),
            vec!["harbor.html", "sunset.jpg", "sunset_2.jpg"]
        );
    }

    #[test]
    fn exact_and_prefix_both_match() {
        let valid = set(&["index", "dawn"]);
        assert!(is_valid("index", &valid));
        assert!(is_valid("index.html", &valid));
        assert!(is_valid("dawn_4.jpg", &valid));
        assert!(!is_valid("dusk.jpg", &valid));
    }

    #[test]
    fn per_level_leaves_subdirectories() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("child/orphan.jpg"));
        touch(&tmp.path().join("orphan.jpg"));

        let outcome = flush_invalid(tmp.path(), &set(&["index"]), FlushMode::PerLevel);

        assert_eq!(outcome.removed.len(), 1);
        assert!(tmp.path().join("child/orphan.jpg").exists());
    }

    #[test]
    fn recursive_applies_set_to_subtree() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("child/orphan.jpg"));
        touch(&tmp.path().join("child/keep.jpg"));

        let outcome = flush_invalid(tmp.path(), &set(&["keep"]), FlushMode::Recursive);

        assert_eq!(outcome.removed, vec![tmp.path().join("child/orphan.jpg")]);
        assert!(tmp.path().join("child/keep.jpg").exists());
    }

    #[test]
    fn missing_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        let outcome = flush_invalid(&tmp.path().join("absent"), &set(&[]), FlushMode::PerLevel);
        assert!(outcome.removed.is_empty());
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn flush_dirs_matches_exactly() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("travel/index.html"));
        touch(&tmp.path().join("travel-old/index.html"));
        touch(&tmp.path().join("css/filmstrip.css"));
        touch(&tmp.path().join("index.html"));

        let outcome = flush_dirs(tmp.path(), &set(&["travel", "css"]));

        assert_eq!(outcome.removed, vec![tmp.path().join("travel-old")]);
        assert!(tmp.path().join("travel").is_dir());
        assert!(tmp.path().join("css").is_dir());
        assert!(tmp.path().join("index.html").exists());
    }

    #[test]
    fn rerun_removes_nothing() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("b.jpg"));
        let valid = set(&["a"]);

        assert_eq!(flush_invalid(tmp.path(), &valid, FlushMode::PerLevel).removed.len(), 1);
        assert!(flush_invalid(tmp.path(), &valid, FlushMode::PerLevel).removed.is_empty());
    }
}
