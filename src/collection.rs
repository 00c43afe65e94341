//! Recursive collection-tree builder.
//!
//! Every source directory becomes a collection with an output directory of
//! its own. The walker visits the tree depth-first and, per directory:
//!
//! 1. lists entries in name order, skipping hidden and housekeeping files;
//! 2. recurses into subdirectories (ordered by their name prefix);
//! 3. cuts variants for changed JPEG sources and reads EXIF for all of them;
//! 4. sorts items: explicit positions first, then unordered items by date;
//! 5. renders `index.html` plus one detail page per item carrying EXIF;
//! 6. removes files and subdirectories no longer backed by a source.
//!
//! ```text
//! content/                         public/
//! ├── _1_Home/                     ├── index.html          (cover page)
//! │   ├── *Harbor.jpg              ├── home/
//! │   └── _3_Sunset.jpg            │   ├── index.html      (gallery)
//! └── _2_Travel/                   │   ├── harbor.jpg, harbor_2.jpg, harbor.html
//!     └── Japan/                   │   └── sunset.jpg, sunset.html
//!         └── Dawn.jpg             └── travel/
//!                                      ├── index.html      (cover page)
//!                                      └── japan/ …
//! ```
//!
//! Files at the root of the source tree are ignored: the root only holds
//! collections. Change detection compares the source bytes with the
//! byte-for-byte original copy in the output directory, so an unchanged
//! rebuild decodes nothing and rewrites nothing.

use crate::config::SiteConfig;
use crate::fingerprint;
use crate::flush::{FlushMode, FlushOutcome, ValidFileSet, flush_dirs, flush_invalid};
use crate::imaging::{
    DerivedVariant, ImageBackend, Quality, cut_variants, supported_input_extensions,
};
use crate::metadata::{ExifInfo, read_exif};
use crate::naming::{
    NameWarning, NamingRules, ParsedName, extension, parse_entry_name, sanitize_slug,
    strip_extension,
};
use crate::render::{DetailView, GalleryKind, GalleryView, ImageRef, Neighbor, Templates, Tile};
use crate::report::{BuildReport, Issue};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Base name of every collection's landing page.
pub const INDEX_PAGE: &str = "index";

/// Platform droppings that are never content.
pub const HOUSEKEEPING_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// One media file of a collection, with everything its pages need.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// Source file name, as found on disk.
    pub filename: String,
    /// Display title with the extension stripped.
    pub title: String,
    /// Base name of every output file of this item.
    pub slug: String,
    pub order: u32,
    pub is_cover: bool,
    pub is_untitled: bool,
    pub includes_exif: bool,
    pub date: Option<NaiveDateTime>,
    pub date_display: Option<String>,
    pub camera: Option<String>,
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub variants: Vec<DerivedVariant>,
}

impl ItemRecord {
    /// Title to show, or `None` for untitled items.
    pub fn shown_title(&self) -> Option<&str> {
        (!self.is_untitled && !self.title.is_empty()).then_some(self.title.as_str())
    }

    pub fn detail_page(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Image that represents a collection on its parent's cover page.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverImage {
    /// Directory of the variants relative to the collection's own
    /// directory: empty for its own items, `child/` for a child's cover.
    pub prefix: String,
    pub title: String,
    pub variants: Vec<DerivedVariant>,
}

/// A collection and everything below it.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionNode {
    pub title: String,
    /// Output directory name; empty for the root.
    pub slug: String,
    /// Output directory relative to the output root.
    pub output_path: PathBuf,
    pub order: u32,
    pub is_cover: bool,
    pub items: Vec<ItemRecord>,
    pub children: Vec<CollectionNode>,
    pub cover: Option<CoverImage>,
}

impl CollectionNode {
    /// Collections with children render a cover page and no detail pages.
    pub fn is_cover_page(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A directory entry worth looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub is_dir: bool,
}

/// A subdirectory, decoded and assigned its output name.
#[derive(Debug, Clone)]
pub struct ChildPlan {
    pub name: String,
    pub parsed: ParsedName,
    pub slug: String,
    pub warning: Option<NameWarning>,
}

/// Order two entries: explicit positions ascending, explicit before
/// unordered, unordered by capture date (undated first).
pub fn compare_order(
    a_order: u32,
    a_date: Option<&NaiveDateTime>,
    b_order: u32,
    b_date: Option<&NaiveDateTime>,
) -> Ordering {
    match (a_order, b_order) {
        (0, 0) => a_date.cmp(&b_date),
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        (a, b) => a.cmp(&b),
    }
}

/// Stable sort; ties keep enumeration order.
pub fn sort_items(items: &mut [ItemRecord]) {
    items.sort_by(|a, b| compare_order(a.order, a.date.as_ref(), b.order, b.date.as_ref()));
}

/// Previous and next positions around `index`, wrapping at both ends.
/// A single entry has no neighbours.
pub fn neighbors(len: usize, index: usize) -> Option<(usize, usize)> {
    if len < 2 || index >= len {
        return None;
    }
    Some(((index + len - 1) % len, (index + 1) % len))
}

/// The flagged item, else the first item, else the flagged child's cover,
/// else the first child's cover.
pub fn select_cover(items: &[ItemRecord], children: &[CollectionNode]) -> Option<CoverImage> {
    if let Some(item) = items.iter().find(|i| i.is_cover).or_else(|| items.first()) {
        return Some(CoverImage {
            prefix: String::new(),
            title: item.title.clone(),
            variants: item.variants.clone(),
        });
    }
    let child = children
        .iter()
        .find(|c| c.is_cover && c.cover.is_some())
        .or_else(|| children.iter().find(|c| c.cover.is_some()))?;
    let cover = child.cover.as_ref()?;
    Some(CoverImage {
        prefix: format!("{}/{}", child.slug, cover.prefix),
        title: cover.title.clone(),
        variants: cover.variants.clone(),
    })
}

/// Output base name for a title, falling back to the raw name's stem.
pub fn slug_for(title: &str, raw_name: &str) -> String {
    let slug = sanitize_slug(title);
    if !slug.is_empty() {
        return slug;
    }
    let fallback = sanitize_slug(strip_extension(raw_name));
    if fallback.is_empty() {
        "untitled".to_string()
    } else {
        fallback
    }
}

fn unique_slug(slug: String, used: &mut BTreeSet<String>) -> String {
    let mut candidate = slug.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{slug}-{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn is_housekeeping(name: &str) -> bool {
    name.starts_with('.') || HOUSEKEEPING_FILES.contains(&name)
}

fn is_media(name: &str) -> bool {
    let ext = extension(name);
    let ext = ext.trim_start_matches('.');
    supported_input_extensions().contains(&ext)
}

/// List `dir` in name order, without hidden or housekeeping entries.
pub fn list_entries(dir: &Path) -> io::Result<Vec<SourceEntry>> {
    let mut entries: Vec<SourceEntry> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            if is_housekeeping(&name) {
                return None;
            }
            Some(SourceEntry {
                is_dir: e.path().is_dir(),
                name,
            })
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Decode, name and order the subdirectories among `entries`.
pub fn plan_children(entries: &[SourceEntry], rules: &NamingRules) -> Vec<ChildPlan> {
    let mut used = BTreeSet::new();
    let mut plans: Vec<ChildPlan> = entries
        .iter()
        .filter(|e| e.is_dir)
        .map(|e| {
            let (parsed, warning) = parse_entry_name(&e.name, rules);
            let slug = unique_slug(slug_for(&parsed.display_title, &e.name), &mut used);
            ChildPlan {
                name: e.name.clone(),
                parsed,
                slug,
                warning,
            }
        })
        .collect();
    plans.sort_by(|a, b| compare_order(a.parsed.explicit_order, None, b.parsed.explicit_order, None));
    plans
}

/// Builds collections under one output root and accumulates a [`BuildReport`].
pub struct Walker<'a, B: ImageBackend> {
    backend: &'a B,
    templates: &'a Templates,
    source_root: PathBuf,
    output_root: PathBuf,
    rules: NamingRules,
    quality: Quality,
    default_copyright: Option<String>,
    force: bool,
    reserved_dirs: BTreeSet<String>,
    report: BuildReport,
}

impl<'a, B: ImageBackend> Walker<'a, B> {
    pub fn new(config: &SiteConfig, templates: &'a Templates, backend: &'a B, force: bool) -> Self {
        Self {
            backend,
            templates,
            source_root: config.source_dir.clone(),
            output_root: config.output_dir.clone(),
            rules: config.naming_rules(),
            quality: Quality::new(config.jpeg_quality),
            default_copyright: config.default_copyright().map(str::to_string),
            force,
            reserved_dirs: BTreeSet::new(),
            report: BuildReport::default(),
        }
    }

    /// Directories at the output root that belong to the site scaffold, not
    /// to a collection. They survive the root sweep, and source collections
    /// with the same name are rejected.
    pub fn reserve_dirs<I: IntoIterator<Item = S>, S: Into<String>>(&mut self, names: I) {
        self.reserved_dirs.extend(names.into_iter().map(Into::into));
    }

    pub fn report_mut(&mut self) -> &mut BuildReport {
        &mut self.report
    }

    pub fn into_report(self) -> BuildReport {
        self.report
    }

    /// Build the collection at `source_rel` into `output_rel`, recursively.
    ///
    /// An empty `source_rel` denotes the root, whose stray files are ignored.
    pub fn build_collection(&mut self, source_rel: &Path, output_rel: &Path, name: &str) -> CollectionNode {
        let (parsed, warning) = parse_entry_name(name, &self.rules);
        if let Some(warning) = warning {
            self.name_issue(source_rel, warning);
        }
        let is_root = source_rel.as_os_str().is_empty();
        self.walk(source_rel, output_rel, parsed, is_root)
    }

    fn walk(
        &mut self,
        source_rel: &Path,
        output_rel: &Path,
        parsed: ParsedName,
        is_root: bool,
    ) -> CollectionNode {
        let source_dir = self.source_root.join(source_rel);
        let output_dir = self.output_root.join(output_rel);
        self.report.collections += 1;

        let mut node = CollectionNode {
            title: parsed.display_title,
            slug: output_rel
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            output_path: output_rel.to_path_buf(),
            order: parsed.explicit_order,
            is_cover: parsed.is_cover,
            items: Vec::new(),
            children: Vec::new(),
            cover: None,
        };

        if let Err(e) = fs::create_dir_all(&output_dir) {
            error!(path = %output_dir.display(), error = %e, "cannot create output directory");
            self.issue(output_dir.display().to_string(), e);
            return node;
        }
        let entries = match list_entries(&source_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(path = %source_dir.display(), error = %e, "cannot list source directory");
                self.issue(source_rel.display().to_string(), e);
                Vec::new()
            }
        };

        for plan in plan_children(&entries, &self.rules) {
            let child_source = source_rel.join(&plan.name);
            if let Some(warning) = plan.warning {
                self.name_issue(&child_source, warning);
            }
            if is_root && self.reserved_dirs.contains(&plan.slug) {
                warn!(path = %child_source.display(), "collection name collides with a site directory");
                self.issue(
                    child_source.display().to_string(),
                    format!("collection output '{}' is reserved; skipped", plan.slug),
                );
                continue;
            }
            let child = self.walk(&child_source, &output_rel.join(&plan.slug), plan.parsed, false);
            node.children.push(child);
        }

        let mut valid: ValidFileSet = BTreeSet::from([INDEX_PAGE.to_string()]);
        // Item slugs must not shadow the gallery page.
        let mut used_slugs = BTreeSet::from([INDEX_PAGE.to_string()]);
        for entry in entries.iter().filter(|e| !e.is_dir) {
            if is_root {
                debug!(file = %entry.name, "ignoring file at source root");
                continue;
            }
            if !is_media(&entry.name) {
                debug!(file = %source_rel.join(&entry.name).display(), "not a JPEG source; skipped");
                continue;
            }
            if let Some(item) = self.build_item(source_rel, &output_dir, &entry.name, &mut valid, &mut used_slugs) {
                node.items.push(item);
            }
        }

        sort_items(&mut node.items);
        node.cover = select_cover(&node.items, &node.children);
        self.report.items += node.items.len();

        self.render_pages(&node, &output_dir);

        self.absorb(flush_invalid(&output_dir, &valid, FlushMode::PerLevel));
        let mut allowed: BTreeSet<String> = node.children.iter().map(|c| c.slug.clone()).collect();
        if is_root {
            allowed.extend(self.reserved_dirs.iter().cloned());
        }
        self.absorb(flush_dirs(&output_dir, &allowed));

        node
    }

    fn build_item(
        &mut self,
        source_rel: &Path,
        output_dir: &Path,
        name: &str,
        valid: &mut ValidFileSet,
        used_slugs: &mut BTreeSet<String>,
    ) -> Option<ItemRecord> {
        let rel = source_rel.join(name);
        let (parsed, warning) = parse_entry_name(name, &self.rules);
        if let Some(warning) = warning {
            self.name_issue(&rel, warning);
        }
        let title = strip_extension(&parsed.display_title).to_string();
        let slug = unique_slug(slug_for(&title, name), used_slugs);
        // The slug stays valid even if cutting fails, so earlier output survives.
        valid.insert(slug.clone());

        let source = self.source_root.join(&rel);
        let source_bytes = match fs::read(&source) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %rel.display(), error = %e, "cannot read source");
                self.issue(rel.display().to_string(), e);
                return None;
            }
        };

        let ext = extension(name);
        let original = output_dir.join(format!("{slug}{ext}"));
        let changed = self.force
            || !fingerprint::unchanged(&source_bytes, &fingerprint::read_or_empty(&original));

        let variants = match cut_variants(
            self.backend,
            &source,
            output_dir,
            &slug,
            &ext,
            !changed,
            self.quality,
        ) {
            Ok(variants) => variants,
            Err(e) => {
                error!(path = %rel.display(), error = %e, "cutting variants failed");
                self.issue(rel.display().to_string(), e);
                return None;
            }
        };
        if changed {
            debug!(path = %rel.display(), variants = variants.len(), "cut variants");
            self.report.cut += 1;
        } else {
            debug!(path = %rel.display(), "unchanged");
            self.report.unchanged += 1;
        }

        let exif = match read_exif(&mut Cursor::new(source_bytes.as_slice())) {
            Ok(exif) => exif,
            Err(e) => {
                warn!(path = %rel.display(), error = %e, "unreadable EXIF; item shown without it");
                self.issue(rel.display().to_string(), e);
                None
            }
        };

        Some(self.item_record(name, title, slug, parsed, exif, variants))
    }

    fn item_record(
        &self,
        name: &str,
        title: String,
        slug: String,
        parsed: ParsedName,
        exif: Option<ExifInfo>,
        variants: Vec<DerivedVariant>,
    ) -> ItemRecord {
        let mut item = ItemRecord {
            filename: name.to_string(),
            title,
            slug,
            order: parsed.explicit_order,
            is_cover: parsed.is_cover,
            is_untitled: parsed.is_untitled,
            includes_exif: false,
            date: None,
            date_display: None,
            camera: None,
            copyright: None,
            description: None,
            variants,
        };
        if let Some(exif) = exif {
            let summary = exif.camera.summary();
            item.includes_exif = true;
            item.date_display = exif.date_display();
            item.date = exif.date;
            item.camera = (!summary.is_empty()).then_some(summary);
            item.copyright = exif.copyright.or_else(|| self.default_copyright.clone());
            item.description = exif.description;
        }
        item
    }

    fn render_pages(&mut self, node: &CollectionNode, output_dir: &Path) {
        let section = node
            .output_path
            .components()
            .next()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default();

        let item_tile = |item: &ItemRecord, linked: bool| Tile {
            title: item.shown_title().unwrap_or_default().to_string(),
            href: (linked && item.includes_exif).then(|| item.detail_page()),
            image: ImageRef::from_variants("", &item.variants, &item.title),
        };

        if node.is_cover_page() {
            let mut tiles: Vec<Tile> = node
                .children
                .iter()
                .map(|child| Tile {
                    title: child.title.clone(),
                    href: Some(format!("{}/{}.html", child.slug, INDEX_PAGE)),
                    image: child.cover.as_ref().and_then(|cover| {
                        let prefix = format!("{}/{}", child.slug, cover.prefix);
                        ImageRef::from_variants(&prefix, &cover.variants, &cover.title)
                    }),
                })
                .collect();
            tiles.extend(node.items.iter().map(|item| item_tile(item, false)));
            let html = self.templates.gallery(&GalleryView {
                title: &node.title,
                kind: GalleryKind::Cover,
                section: &section,
                tiles: &tiles,
            });
            self.write_page(&output_dir.join(format!("{INDEX_PAGE}.html")), &html);
            return;
        }

        let tiles: Vec<Tile> = node.items.iter().map(|item| item_tile(item, true)).collect();
        let html = self.templates.gallery(&GalleryView {
            title: &node.title,
            kind: GalleryKind::Gallery,
            section: &section,
            tiles: &tiles,
        });
        self.write_page(&output_dir.join(format!("{INDEX_PAGE}.html")), &html);

        let detailed: Vec<&ItemRecord> = node.items.iter().filter(|i| i.includes_exif).collect();
        let neighbor = |item: &ItemRecord| Neighbor {
            title: item.shown_title().unwrap_or_default().to_string(),
            href: item.detail_page(),
        };
        for (index, item) in detailed.iter().enumerate() {
            let Some(image) = ImageRef::from_variants("", &item.variants, &item.title) else {
                continue;
            };
            let (prev, next) = match neighbors(detailed.len(), index) {
                Some((p, n)) => (Some(neighbor(detailed[p])), Some(neighbor(detailed[n]))),
                None => (None, None),
            };
            let html = self.templates.detail(&DetailView {
                collection_title: &node.title,
                section: &section,
                title: item.shown_title(),
                image: &image,
                date: item.date_display.as_deref(),
                camera: item.camera.as_deref(),
                description: item.description.as_deref(),
                copyright: item.copyright.as_deref(),
                prev: prev.as_ref(),
                next: next.as_ref(),
            });
            self.write_page(&output_dir.join(item.detail_page()), &html);
        }
    }

    fn write_page(&mut self, path: &Path, html: &str) {
        match fingerprint::write_if_changed(path, html.as_bytes()) {
            Ok(true) => self.report.pages_written += 1,
            Ok(false) => {}
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot write page");
                self.issue(path.display().to_string(), e);
            }
        }
    }

    fn absorb(&mut self, outcome: FlushOutcome) {
        self.report.removed += outcome.removed.len();
        self.report.issues.extend(outcome.issues);
    }

    fn name_issue(&mut self, rel: &Path, warning: NameWarning) {
        warn!(path = %rel.display(), "{warning}");
        self.issue(rel.display().to_string(), warning);
    }

    fn issue(&mut self, path: String, message: impl ToString) {
        self.report.issues.push(Issue::new(path, message));
    }
}
