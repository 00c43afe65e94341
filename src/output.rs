//! CLI output formatting for build and deploy.
//!
//! # Information-First Display
//!
//! Every collection is shown by its title and position among its siblings,
//! with the output directory as an indented context line. Items follow the
//! same two-level pattern: a header line with the title (or the file name in
//! parentheses when untitled), then indented detail lines.
//!
//! ## Build
//!
//! ```text
//! Collections
//! 001 Travel → travel/
//!     001 Japan (2 photos) → travel/japan/
//!         001 Tokyo Tower → tokyo-tower.html
//!             Taken: June, 2021
//!         002 (IMG_0042.jpg)
//!
//! Built 3 collections, 2 items (1 cut, 1 unchanged), 5 files written, 0 removed
//! ```
//!
//! ## Deploy
//!
//! ```text
//! Deployed 12 files: 3 uploaded, 9 unchanged, 1 deleted remotely
//! ```
//!
//! Issues from either phase are listed last under an `Issues` header.
//!
//! Each phase has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::collection::{CollectionNode, ItemRecord};
use crate::report::{BuildReport, DeployReport, Issue};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Output directory of a collection, slash-terminated; `/` for the root.
fn dir_label(node: &CollectionNode) -> String {
    let parts: Vec<String> = node
        .output_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("{}/", parts.join("/"))
    }
}

fn collection_header(index: usize, node: &CollectionNode) -> String {
    if node.is_cover_page() {
        format!("{} {} → {}", format_index(index), node.title, dir_label(node))
    } else {
        format!(
            "{} {} ({}) → {}",
            format_index(index),
            node.title,
            plural(node.items.len(), "photo", "photos"),
            dir_label(node)
        )
    }
}

/// Titled items show their title and detail page; untitled ones show the
/// file name in parentheses.
fn item_line(index: usize, item: &ItemRecord) -> String {
    let name = match item.shown_title() {
        Some(title) => title.to_string(),
        None => format!("({})", item.filename),
    };
    if item.includes_exif {
        format!("{} {} → {}", format_index(index), name, item.detail_page())
    } else {
        format!("{} {}", format_index(index), name)
    }
}

fn format_node(node: &CollectionNode, depth: usize, lines: &mut Vec<String>) {
    for (i, child) in node.children.iter().enumerate() {
        lines.push(format!("{}{}", indent(depth), collection_header(i + 1, child)));
        format_node(child, depth + 1, lines);
    }
    for (i, item) in node.items.iter().enumerate() {
        lines.push(format!("{}{}", indent(depth), item_line(i + 1, item)));
        if let Some(date) = &item.date_display {
            lines.push(format!("{}    Taken: {}", indent(depth), date));
        }
        if let Some(camera) = &item.camera {
            lines.push(format!("{}    Camera: {}", indent(depth), camera));
        }
    }
}

fn format_issues(issues: &[Issue]) -> Vec<String> {
    if issues.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Issues".to_string()];
    lines.extend(issues.iter().map(|issue| format!("    {issue}")));
    lines
}

/// Format the built collection tree followed by the build summary.
pub fn format_build_output(root: &CollectionNode, report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    format_node(root, 0, &mut lines);
    lines.push(String::new());
    lines.extend(format_build_report(report));
    lines
}

/// Format the one-line build summary plus any issues.
pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Built {}, {} ({} cut, {} unchanged), {} written, {} removed",
        plural(report.collections, "collection", "collections"),
        plural(report.items, "item", "items"),
        report.cut,
        report.unchanged,
        plural(report.pages_written, "file", "files"),
        report.removed,
    )];
    lines.extend(format_issues(&report.issues));
    lines
}

/// Format the one-line deploy summary plus any issues.
pub fn format_deploy_report(report: &DeployReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Deployed {}: {} uploaded, {} unchanged, {} deleted remotely",
        plural(report.scanned, "file", "files"),
        report.uploaded,
        report.skipped,
        report.deleted,
    )];
    lines.extend(format_issues(&report.issues));
    lines
}

pub fn print_build_output(root: &CollectionNode, report: &BuildReport) {
    for line in format_build_output(root, report) {
        println!("{}", line);
    }
}

pub fn print_deploy_report(report: &DeployReport) {
    for line in format_deploy_report(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn item(filename: &str, title: &str, exif: bool) -> ItemRecord {
        ItemRecord {
            filename: filename.into(),
            title: title.into(),
            slug: title.to_lowercase().replace(' ', "-"),
            order: 0,
            is_cover: false,
            is_untitled: title.is_empty(),
            includes_exif: exif,
            date: None,
            date_display: None,
            camera: None,
            copyright: None,
            description: None,
            variants: Vec::new(),
        }
    }

    fn node(title: &str, path: &str) -> CollectionNode {
        CollectionNode {
            title: title.into(),
            slug: path.rsplit('/').next().unwrap_or_default().into(),
            output_path: PathBuf::from(path),
            order: 0,
            is_cover: false,
            items: Vec::new(),
            children: Vec::new(),
            cover: None,
        }
    }

    fn tree() -> CollectionNode {
        let mut tower = item("_1_Tokyo Tower.jpg", "Tokyo Tower", true);
        tower.date_display = Some("June, 2021".into());
        tower.camera = Some("f/8 | 1/250s | ISO 100".into());
        let mut japan = node("Japan", "travel/japan");
        japan.items = vec![tower, item("IMG_0042.jpg", "", false)];
        let mut travel = node("Travel", "travel");
        travel.children = vec![japan];
        let mut root = node("My Photos", "");
        root.children = vec![travel];
        root
    }

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "photo", "photos"), "1 photo");
        assert_eq!(plural(0, "photo", "photos"), "0 photos");
    }

    #[test]
    fn root_dir_label_is_slash() {
        assert_eq!(dir_label(&node("Root", "")), "/");
        assert_eq!(dir_label(&node("Japan", "travel/japan")), "travel/japan/");
    }

    #[test]
    fn build_tree_nests_collections_and_items() {
        let lines = format_build_output(&tree(), &BuildReport::default());
        assert_eq!(lines[0], "Collections");
        assert_eq!(lines[1], "001 Travel → travel/");
        assert_eq!(lines[2], "    001 Japan (2 photos) → travel/japan/");
        assert_eq!(lines[3], "        001 Tokyo Tower → tokyo-tower.html");
        assert_eq!(lines[4], "            Taken: June, 2021");
        assert_eq!(lines[5], "            Camera: f/8 | 1/250s | ISO 100");
        assert_eq!(lines[6], "        002 (IMG_0042.jpg)");
    }

    #[test]
    fn build_summary_line() {
        let report = BuildReport {
            collections: 3,
            items: 2,
            cut: 1,
            unchanged: 1,
            pages_written: 5,
            removed: 0,
            issues: Vec::new(),
        };
        assert_eq!(
            format_build_report(&report),
            vec!["Built 3 collections, 2 items (1 cut, 1 unchanged), 5 files written, 0 removed"]
        );
    }

    #[test]
    fn issues_are_listed_after_summary() {
        let report = DeployReport {
            scanned: 2,
            uploaded: 1,
            issues: vec![Issue::new("travel/index.html", "denied")],
            ..DeployReport::default()
        };
        let lines = format_deploy_report(&report);
        assert_eq!(
            lines[0],
            "Deployed 2 files: 1 uploaded, 0 unchanged, 0 deleted remotely"
        );
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Issues");
        assert_eq!(lines[3], "    travel/index.html: denied");
    }

    #[test]
    fn clean_report_has_no_issue_section() {
        let lines = format_deploy_report(&DeployReport::default());
        assert_eq!(lines.len(), 1);
    }
}
