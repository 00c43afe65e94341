//! Site build orchestration.
//!
//! [`build`] turns the source tree into the output tree:
//!
//! 1. checks the source directory (missing is fatal);
//! 2. computes the top-level navigation from the source collections;
//! 3. writes the scaffold: `css/filmstrip.css` and, when configured,
//!    `about/index.html`;
//! 4. walks the source tree with a [`Walker`], which renders every
//!    collection and removes stale output as it goes.
//!
//! Every file is written through [`write_if_changed`], so rebuilding an
//! unchanged source rewrites nothing.

use crate::collection::{CollectionNode, Walker, list_entries, plan_children};
use crate::config::SiteConfig;
use crate::fingerprint::write_if_changed;
use crate::imaging::ImageBackend;
use crate::render::{AboutView, NavLink, STYLESHEET_PATH, Templates, stylesheet};
use crate::report::{BuildReport, Issue};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// Output directory of the stylesheet.
pub const CSS_DIR: &str = "css";
/// Output directory of the about page.
pub const ABOUT_DIR: &str = "about";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("source directory not found: {0}")]
    MissingSource(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The built tree and what happened while building it.
#[derive(Debug)]
pub struct BuildOutcome {
    pub root: CollectionNode,
    pub report: BuildReport,
}

/// Root-level directories owned by the scaffold rather than a collection.
pub fn scaffold_dirs(config: &SiteConfig) -> Vec<&'static str> {
    let mut dirs = vec![CSS_DIR];
    if config.about.enabled() {
        dirs.push(ABOUT_DIR);
    }
    dirs
}

/// Top-level collections in display order, then the about page.
pub fn navigation(config: &SiteConfig) -> Result<Vec<NavLink>, BuildError> {
    let entries = list_entries(&config.source_dir)?;
    let reserved = scaffold_dirs(config);
    let mut nav: Vec<NavLink> = plan_children(&entries, &config.naming_rules())
        .into_iter()
        .filter(|plan| !reserved.contains(&plan.slug.as_str()))
        .map(|plan| NavLink {
            title: plan.parsed.display_title,
            slug: plan.slug,
        })
        .collect();
    if config.about.enabled() {
        nav.push(NavLink {
            title: config.about.title.clone(),
            slug: ABOUT_DIR.to_string(),
        });
    }
    Ok(nav)
}

/// Build the whole site described by `config`.
pub fn build(
    config: &SiteConfig,
    backend: &impl ImageBackend,
    force: bool,
) -> Result<BuildOutcome, BuildError> {
    if !config.source_dir.is_dir() {
        return Err(BuildError::MissingSource(config.source_dir.clone()));
    }
    std::fs::create_dir_all(&config.output_dir)?;

    let templates = Templates::new(config.title.clone(), navigation(config)?);
    let mut walker = Walker::new(config, &templates, backend, force);
    walker.reserve_dirs(scaffold_dirs(config));

    scaffold(config, &templates, walker.report_mut());

    let root = walker.build_collection(Path::new(""), Path::new(""), &config.title);
    let report = walker.into_report();
    info!(
        collections = report.collections,
        items = report.items,
        cut = report.cut,
        pages = report.pages_written,
        removed = report.removed,
        issues = report.issues.len(),
        "build finished"
    );
    Ok(BuildOutcome { root, report })
}

fn scaffold(config: &SiteConfig, templates: &Templates, report: &mut BuildReport) {
    let css = stylesheet(config.cover_columns, config.gallery_columns);
    write_scaffold_file(&config.output_dir.join(STYLESHEET_PATH), css.as_bytes(), report);

    if config.about.enabled() {
        let html = templates.about(&AboutView {
            title: &config.about.title,
            headline: &config.about.headline,
            text: &config.about.text,
            image: &config.about.image,
        });
        let path = config.output_dir.join(ABOUT_DIR).join("index.html");
        write_scaffold_file(&path, html.as_bytes(), report);
    }
}

fn write_scaffold_file(path: &Path, bytes: &[u8], report: &mut BuildReport) {
    let result = match path.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
    .and_then(|()| write_if_changed(path, bytes));

    match result {
        Ok(true) => report.pages_written += 1,
        Ok(false) => {}
        Err(e) => {
            error!(path = %path.display(), error = %e, "cannot write scaffold file");
            report.issues.push(Issue::new(path.display().to_string(), e));
        }
    }
}
