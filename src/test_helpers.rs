//! Shared test utilities: synthetic JPEG fixtures and collection-tree lookups.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_jpeg(&tmp.path().join("content/Travel/_1_Dawn.jpg"), 400, 300);
//!
//! let node = walker.build_collection(Path::new(""), Path::new(""), "Site");
//! let travel = find_child(&node, "Travel");
//! assert_eq!(item_titles(travel), vec!["Dawn"]);
//! ```

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, RgbImage};
use std::path::Path;

use crate::collection::CollectionNode;

// =========================================================================
// JPEG fixtures
// =========================================================================

fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut bytes = Vec::new();
    JpegEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    bytes
}

/// Write a valid JPEG without EXIF, creating parent directories.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, encode_jpeg(width, height)).unwrap();
}

/// EXIF fields a fixture can carry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifFixture<'a> {
    pub date: Option<&'a str>,
    pub copyright: Option<&'a str>,
    pub description: Option<&'a str>,
    pub model: Option<&'a str>,
}

/// Write a valid JPEG with an APP1 EXIF segment right after SOI.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, fixture: &ExifFixture) {
    let ascii = |tag: Tag, text: &str| Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    };
    let mut fields = Vec::new();
    if let Some(date) = fixture.date {
        fields.push(ascii(Tag::DateTimeOriginal, date));
    }
    if let Some(copyright) = fixture.copyright {
        fields.push(ascii(Tag::Copyright, copyright));
    }
    if let Some(description) = fixture.description {
        fields.push(ascii(Tag::ImageDescription, description));
    }
    if let Some(model) = fixture.model {
        fields.push(ascii(Tag::Model, model));
    }

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut tiff = std::io::Cursor::new(Vec::new());
    writer.write(&mut tiff, false).unwrap();
    let tiff = tiff.into_inner();

    let jpeg = encode_jpeg(width, height);
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    bytes.extend_from_slice(&segment_len.to_be_bytes());
    bytes.extend_from_slice(b"Exif\0\0");
    bytes.extend_from_slice(&tiff);
    bytes.extend_from_slice(&jpeg[2..]);

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// A JPEG whose only EXIF field is the capture date.
pub fn write_dated_jpeg(path: &Path, date: &str) {
    write_jpeg_with_exif(
        path,
        64,
        48,
        &ExifFixture {
            date: Some(date),
            ..Default::default()
        },
    );
}

// =========================================================================
// Collection lookups (panic with a clear message on miss)
// =========================================================================

/// Find a child collection by title. Panics if not found.
pub fn find_child<'a>(node: &'a CollectionNode, title: &str) -> &'a CollectionNode {
    node.children
        .iter()
        .find(|c| c.title == title)
        .unwrap_or_else(|| {
            let titles = child_titles(node);
            panic!("collection '{title}' not found. Available: {titles:?}")
        })
}

pub fn child_titles(node: &CollectionNode) -> Vec<&str> {
    node.children.iter().map(|c| c.title.as_str()).collect()
}

/// All item titles in collection order.
pub fn item_titles(node: &CollectionNode) -> Vec<&str> {
    node.items.iter().map(|i| i.title.as_str()).collect()
}

/// Sorted file names (not directories) directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
