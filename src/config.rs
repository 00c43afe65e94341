//! Site configuration.
//!
//! All settings live in one `config.toml` (by default in the working
//! directory). The file is loaded once at startup into a [`SiteConfig`] that
//! is passed explicitly to every stage: the walker, the templates, the
//! deployer, and the storage driver. Nothing reads settings behind the
//! caller's back, so each component can be tested with a synthetic config.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Filmstrip"        # Title of the root cover page
//! source_dir = "content"     # Directory tree of collections and images
//! output_dir = "public"      # Generated site
//! workers = 4                # Concurrent uploads during deploy (min 1)
//! jpeg_quality = 90          # Re-encode quality for resized variants (1-100)
//! auto_untitle = false       # Hide titles of generic camera filenames
//! untitled_pattern = "dsc"   # Case-insensitive substring marking those names
//! copyright = ""             # Used when an image carries no EXIF copyright
//! cover_columns = 3          # Grid columns on cover pages
//! gallery_columns = 4        # Grid columns on gallery pages
//!
//! [about]
//! title = ""                 # Empty disables the about page
//! headline = ""
//! text = ""                  # Markdown
//! image = ""                 # URL or site path of a portrait
//!
//! [storage]
//! driver = "s3"
//! bucket = ""
//! region = ""                # Empty = taken from the environment
//! endpoint = ""              # S3-compatible endpoint override
//! asset_max_age = 3600       # Cache lifetime (seconds) for non-HTML files
//! ```
//!
//! Config files are sparse: stock defaults are serialized to a TOML table
//! and the user's file is merged on top ([`merge_toml`]), so a file only
//! names the values it changes. Unknown keys are rejected to catch typos.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::naming::NamingRules;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Title of the root cover page.
    pub title: String,
    /// Source tree: one directory per collection, nested arbitrarily.
    pub source_dir: PathBuf,
    /// Where the site is generated, and what deploy uploads.
    pub output_dir: PathBuf,
    /// Number of concurrent upload workers.
    pub workers: usize,
    /// JPEG quality for resized variants.
    pub jpeg_quality: u32,
    /// Flag images whose title matches `untitled_pattern` as untitled.
    pub auto_untitle: bool,
    pub untitled_pattern: String,
    /// Fallback copyright for images without an EXIF copyright tag.
    pub copyright: String,
    pub cover_columns: u32,
    pub gallery_columns: u32,
    pub about: AboutConfig,
    pub storage: StorageConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Filmstrip".to_string(),
            source_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("public"),
            workers: 4,
            jpeg_quality: 90,
            auto_untitle: false,
            untitled_pattern: "dsc".to_string(),
            copyright: String::new(),
            cover_columns: 3,
            gallery_columns: 4,
            about: AboutConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::Validation(
                "jpeg_quality must be 1-100".into(),
            ));
        }
        if self.cover_columns == 0 || self.gallery_columns == 0 {
            return Err(ConfigError::Validation(
                "cover_columns and gallery_columns must be non-zero".into(),
            ));
        }
        if self.auto_untitle && self.untitled_pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "untitled_pattern must not be empty when auto_untitle is set".into(),
            ));
        }
        Ok(())
    }

    /// Naming rules derived from the untitle settings.
    pub fn naming_rules(&self) -> NamingRules {
        NamingRules {
            auto_untitle: self.auto_untitle,
            untitled_pattern: self.untitled_pattern.clone(),
        }
    }

    /// Worker count for deploy; zero is treated as one.
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }

    /// Configured copyright, if any.
    pub fn default_copyright(&self) -> Option<&str> {
        let c = self.copyright.trim();
        (!c.is_empty()).then_some(c)
    }
}

/// Optional about page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AboutConfig {
    /// Page title. The page is only generated when this is non-empty.
    pub title: String,
    pub headline: String,
    /// Body text in markdown.
    pub text: String,
    /// Portrait image URL or site path.
    pub image: String,
}

impl AboutConfig {
    pub fn enabled(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Remote storage settings for deploy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend identifier. `"s3"` is the only shipped backend.
    pub driver: String,
    pub bucket: String,
    /// AWS region; empty means use `AWS_REGION` / `AWS_DEFAULT_REGION`.
    pub region: String,
    /// Endpoint override for S3-compatible stores; empty means AWS.
    pub endpoint: String,
    /// `Cache-Control: max-age` for everything except HTML.
    pub asset_max_age: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: "s3".to_string(),
            bucket: String::new(),
            region: String::new(),
            endpoint: String::new(),
            asset_max_age: 3600,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value; `Ok(None)` if it doesn't exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load the config file at `path`, merged over stock defaults and validated.
///
/// A missing file yields the stock defaults. An unreadable or invalid file
/// is an error; callers treat it as fatal.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(path)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Filmstrip Configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Title of the root cover page.
title = "Filmstrip"

# Source tree: each directory is a collection, nested as deep as you like.
# Name files and directories "_N_Title" to order them, "*Title" to mark the
# cover of a collection, or "*_N_Title" for both.
source_dir = "content"

# Generated site (uploaded by `filmstrip deploy`).
output_dir = "public"

# Concurrent upload workers during deploy (minimum 1).
workers = 4

# JPEG quality for resized variants (1-100). Originals are copied untouched.
jpeg_quality = 90

# Hide titles of generic camera filenames such as DSC_0042.jpg.
auto_untitle = false
untitled_pattern = "dsc"

# Copyright shown for images that carry no EXIF copyright.
copyright = ""

# Grid columns on cover pages (collections of collections) and galleries.
cover_columns = 3
gallery_columns = 4

# ---------------------------------------------------------------------------
# About page (generated at /about/ when title is set)
# ---------------------------------------------------------------------------
[about]
title = ""
headline = ""
# Markdown.
text = ""
image = ""

# ---------------------------------------------------------------------------
# Remote storage
# ---------------------------------------------------------------------------
[storage]
driver = "s3"
bucket = ""
# Empty = AWS_REGION / AWS_DEFAULT_REGION from the environment.
region = ""
# Endpoint override for S3-compatible stores.
endpoint = ""
# Cache-Control max-age (seconds) for everything except HTML pages.
asset_max_age = 3600
"##
}
