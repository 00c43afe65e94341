//! EXIF extraction for detail pages.
//!
//! Every media item may carry an EXIF block. When present it supplies:
//!
//! - **Copyright** (`Copyright`): falls back to the configured site default.
//! - **Description** (`ImageDescription`).
//! - **Capture date** (`DateTimeOriginal`, `YYYY:MM:DD HH:MM:SS`): used to
//!   order unnumbered items and displayed as `"January, 2006"`.
//! - **Camera summary**: f-number, exposure time, ISO, camera model and lens
//!   model joined with `" | "`. The 35 mm focal length is appended only for
//!   zoom lenses, recognised by a `-` in the lens model (`24-70mm`): a prime
//!   lens already names its focal length.
//!
//! Missing fields are skipped silently. A block that cannot be decoded is an
//! error; the caller degrades the item to EXIF-less and records an issue.

use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::io::{BufRead, Seek};
use thiserror::Error;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";
const DISPLAY_DATE_FORMAT: &str = "%B, %Y";
const SUMMARY_SEPARATOR: &str = " | ";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("EXIF decode failed: {0}")]
    Exif(#[from] exif::Error),
}

/// Fields lifted from an item's EXIF block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifInfo {
    pub copyright: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub camera: CameraSettings,
}

impl ExifInfo {
    /// Capture date as shown on detail pages, e.g. `"March, 2019"`.
    pub fn date_display(&self) -> Option<String> {
        self.date.map(format_display_date)
    }
}

/// Shooting parameters. Rationals are kept as `(numerator, denominator)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraSettings {
    pub f_number: Option<(u32, u32)>,
    pub exposure: Option<(u32, u32)>,
    pub iso: Option<u32>,
    pub model: Option<String>,
    pub lens: Option<String>,
    pub focal_length_35mm: Option<u32>,
}

impl CameraSettings {
    /// One-line summary, e.g. `f/2.8 | 1/250s | ISO 200 | X-T3 | 18-55mm | 27mm`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some((num, den)) = self.f_number.filter(|&(_, den)| den != 0) {
            if den == 1 {
                parts.push(format!("f/{num}"));
            } else {
                parts.push(format!("f/{:.1}", num as f64 / den as f64));
            }
        }
        if let Some((num, den)) = self.exposure.filter(|&(_, den)| den != 0) {
            parts.push(format!("{}s", format_rational(num, den)));
        }
        if let Some(iso) = self.iso {
            parts.push(format!("ISO {iso}"));
        }
        if let Some(model) = &self.model {
            parts.push(model.clone());
        }
        if let Some(lens) = &self.lens {
            parts.push(lens.clone());
            if lens.contains('-')
                && let Some(focal) = self.focal_length_35mm
            {
                parts.push(format!("{focal}mm"));
            }
        }

        parts.join(SUMMARY_SEPARATOR)
    }
}

/// Read the EXIF block of a JPEG/TIFF stream.
///
/// Returns `Ok(None)` when the stream carries no EXIF at all.
pub fn read_exif<R: BufRead + Seek>(reader: &mut R) -> Result<Option<ExifInfo>, MetadataError> {
    let exif = match Reader::new().read_from_container(reader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let ascii = |tag| exif.get_field(tag, In::PRIMARY).and_then(|f| ascii_value(&f.value));
    let rational = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| rational_value(&f.value))
    };
    let unsigned = |tag| {
        exif.get_field(tag, In::PRIMARY)
            .and_then(|f| unsigned_value(&f.value))
    };

    Ok(Some(ExifInfo {
        copyright: ascii(Tag::Copyright),
        description: ascii(Tag::ImageDescription),
        date: ascii(Tag::DateTimeOriginal).and_then(|s| parse_exif_date(&s)),
        camera: CameraSettings {
            f_number: rational(Tag::FNumber),
            exposure: rational(Tag::ExposureTime),
            iso: unsigned(Tag::PhotographicSensitivity),
            model: ascii(Tag::Model),
            lens: ascii(Tag::LensModel),
            focal_length_35mm: unsigned(Tag::FocalLengthIn35mmFilm),
        },
    }))
}

/// Parse an EXIF `DateTimeOriginal` string.
pub fn parse_exif_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), EXIF_DATE_FORMAT).ok()
}

pub fn format_display_date(date: NaiveDateTime) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// `num/den` reduced to lowest terms; whole numbers print without a fraction.
fn format_rational(num: u32, den: u32) -> String {
    let divisor = gcd(num, den).max(1);
    let (num, den) = (num / divisor, den / divisor);
    if den == 1 {
        num.to_string()
    } else {
        format!("{num}/{den}")
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn ascii_value(value: &Value) -> Option<String> {
    let Value::Ascii(vec) = value else {
        return None;
    };
    let s = std::str::from_utf8(vec.first()?).ok()?;
    let trimmed = s.trim_end_matches('\0').trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn rational_value(value: &Value) -> Option<(u32, u32)> {
    match value {
        Value::Rational(vec) => vec.first().map(|r| (r.num, r.denom)),
        _ => None,
    }
}

fn unsigned_value(value: &Value) -> Option<u32> {
    match value {
        Value::Short(vec) => vec.first().map(|v| *v as u32),
        Value::Long(vec) => vec.first().copied(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ExifFixture, write_jpeg, write_jpeg_with_exif};
    use std::fs::File;
    use std::io::{BufReader, Cursor};

    fn settings() -> CameraSettings {
        CameraSettings {
            f_number: Some((28, 10)),
            exposure: Some((1, 250)),
            iso: Some(200),
            model: Some("X-T3".into()),
            lens: Some("XF18-55mmF2.8-4 R LM OIS".into()),
            focal_length_35mm: Some(27),
        }
    }

    #[test]
    fn summary_full_zoom() {
        assert_eq!(
            settings().summary(),
            "f/2.8 | 1/250s | ISO 200 | X-T3 | XF18-55mmF2.8-4 R LM OIS | 27mm"
        );
    }

    #[test]
    fn summary_prime_lens_omits_focal_length() {
        let mut s = settings();
        s.lens = Some("XF35mmF1.4 R".into());
        assert_eq!(s.summary(), "f/2.8 | 1/250s | ISO 200 | X-T3 | XF35mmF1.4 R");
    }

    #[test]
    fn summary_whole_f_number() {
        let s = CameraSettings {
            f_number: Some((8, 1)),
            ..Default::default()
        };
        assert_eq!(s.summary(), "f/8");
    }

    #[test]
    fn summary_reduces_exposure() {
        let s = CameraSettings {
            exposure: Some((10, 2500)),
            ..Default::default()
        };
        assert_eq!(s.summary(), "1/250s");

        let long = CameraSettings {
            exposure: Some((30, 10)),
            ..Default::default()
        };
        assert_eq!(long.summary(), "3s");
    }

    #[test]
    fn summary_skips_missing_fields() {
        let s = CameraSettings {
            iso: Some(400),
            model: Some("Q2".into()),
            ..Default::default()
        };
        assert_eq!(s.summary(), "ISO 400 | Q2");
        assert_eq!(CameraSettings::default().summary(), "");
    }

    #[test]
    fn exif_date_parses_and_displays() {
        let date = parse_exif_date("2019:03:14 15:09:26").unwrap();
        assert_eq!(format_display_date(date), "March, 2019");
        assert!(parse_exif_date("not a date").is_none());
    }

    #[test]
    fn jpeg_without_exif_is_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        write_jpeg(&path, 16, 16);

        let mut reader = BufReader::new(File::open(&path).unwrap());
        assert_eq!(read_exif(&mut reader).unwrap(), None);
    }

    #[test]
    fn garbage_is_an_error() {
        let mut reader = Cursor::new(b"definitely not an image".to_vec());
        assert!(read_exif(&mut reader).is_err());
    }

    #[test]
    fn reads_embedded_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("tagged.jpg");
        write_jpeg_with_exif(
            &path,
            16,
            16,
            &ExifFixture {
                date: Some("2020:07:01 10:00:00"),
                copyright: Some("Jane Roe"),
                description: Some("Low tide"),
                model: Some("X100V"),
            },
        );

        let mut reader = BufReader::new(File::open(&path).unwrap());
        let info = read_exif(&mut reader).unwrap().unwrap();
        assert_eq!(info.copyright.as_deref(), Some("Jane Roe"));
        assert_eq!(info.description.as_deref(), Some("Low tide"));
        assert_eq!(info.date_display().as_deref(), Some("July, 2020"));
        assert_eq!(info.camera.summary(), "X100V");
    }
}
