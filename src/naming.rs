//! Filename conventions for ordering, covers, and titles.
//!
//! Files and directories share one naming convention. The filesystem is the
//! only source of ordering information, so it lives in prefixes:
//!
//! - `_3_Sunset.jpg` → explicit position 3, title "Sunset.jpg"
//! - `*Harbor.jpg` → cover image for its collection, unordered
//! - `*_2_Harbor.jpg` → cover image at position 2
//! - `Boat.jpg` → unordered (sorted by capture date)
//!
//! A leading [`COVER_MARKER`] is rewritten to an [`ORDER_MARKER`] before the
//! order prefix is parsed, so the two compose. All leading order markers are
//! stripped, then the remainder is split at the first [`SEPARATOR`].
//!
//! ## Untitled images
//!
//! Straight-from-camera names like `DSC_0042.jpg` are not titles. When
//! `auto_untitle` is enabled, any display title containing the configured
//! pattern (case-insensitive) is flagged untitled and pages omit its title.
//!
//! ## Slugs
//!
//! Output files are named after the title, not the source filename:
//! [`sanitize_slug`] lowercases and replaces everything outside `[a-z0-9-]`
//! with dashes, so `Sunset Beach` becomes `sunset-beach` and its variants
//! `sunset-beach.jpg`, `sunset-beach_2.jpg`, `sunset-beach.html`.

use std::fmt;

/// Marks the representative image of a collection.
pub const COVER_MARKER: char = '*';
/// Introduces an explicit order prefix.
pub const ORDER_MARKER: char = '_';
/// Separates the order token from the title.
pub const SEPARATOR: char = '_';

const MAX_SLUG_LEN: usize = 80;

/// Rules for detecting generic camera filenames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    pub auto_untitle: bool,
    pub untitled_pattern: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            auto_untitle: false,
            untitled_pattern: "dsc".to_string(),
        }
    }
}

/// Result of decoding a file or directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Name with the cover/order prefix removed (extension kept).
    pub display_title: String,
    /// Explicit position; 0 means unordered.
    pub explicit_order: u32,
    pub is_cover: bool,
    pub is_untitled: bool,
}

/// Non-fatal problem found while decoding a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameWarning {
    pub name: String,
    pub token: String,
}

impl fmt::Display for NameWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "order prefix '{}' in '{}' is not a number; treating as unordered",
            self.token, self.name
        )
    }
}

/// Decode a raw name into title, order, and flags.
///
/// A malformed order token never fails the decode: the item becomes
/// unordered and the caller gets a [`NameWarning`] to report.
///
/// - `"_3_Sunset.jpg"` → order 3, title "Sunset.jpg"
/// - `"*Harbor.jpg"` → cover, order 0, title "Harbor.jpg"
/// - `"*_2_Harbor.jpg"` → cover, order 2, title "Harbor.jpg"
/// - `"_x_Boat.jpg"` → order 0, title "x_Boat.jpg", plus a warning
pub fn parse_entry_name(name: &str, rules: &NamingRules) -> (ParsedName, Option<NameWarning>) {
    let mut is_cover = false;
    let mut working = name.to_string();
    if let Some(rest) = name.strip_prefix(COVER_MARKER) {
        is_cover = true;
        working = format!("{ORDER_MARKER}{rest}");
    }

    let mut explicit_order = 0;
    let mut warning = None;
    let display_title = if working.starts_with(ORDER_MARKER) {
        let trimmed = working.trim_start_matches(ORDER_MARKER);
        match trimmed.split_once(SEPARATOR) {
            Some((token, rest)) => match token.parse::<u32>() {
                Ok(order) => {
                    explicit_order = order;
                    rest.to_string()
                }
                Err(_) => {
                    warning = Some(NameWarning {
                        name: name.to_string(),
                        token: token.to_string(),
                    });
                    trimmed.to_string()
                }
            },
            None => trimmed.to_string(),
        }
    } else {
        working
    };

    let is_untitled = rules.auto_untitle
        && !rules.untitled_pattern.is_empty()
        && display_title
            .to_lowercase()
            .contains(&rules.untitled_pattern.to_lowercase());

    (
        ParsedName {
            display_title,
            explicit_order,
            is_cover,
            is_untitled,
        },
        warning,
    )
}

/// Drop the last `.ext` from a name. Names without a dot are returned as-is.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Lowercased extension including the dot (`".jpg"`), or empty.
pub fn extension(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) => name[pos..].to_lowercase(),
        None => String::new(),
    }
}

/// Turn a title into a file- and URL-safe base name.
///
/// - Lowercases ASCII letters; everything outside `[a-z0-9-]` becomes `-`
/// - Collapses consecutive dashes and strips leading/trailing ones
/// - Truncates to 80 characters at the last dash before the limit
pub fn sanitize_slug(title: &str) -> String {
    let slug: String = title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    let trimmed = collapsed.trim_matches('-');

    if trimmed.len() <= MAX_SLUG_LEN {
        return trimmed.to_string();
    }
    let cut = &trimmed[..MAX_SLUG_LEN];
    match cut.rfind('-') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut.to_string(),
    }
}
