//! Locates the embedded `YYYY:MM:DD HH:MM:SS` capture time without parsing
//! the metadata container. Content is treated as opaque bytes, line by line.

use crate::metadata::CaptureTimestamp;
use anyhow::{Context, Result};
use regex::bytes::{Captures, Regex};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;

fn datetime_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]{4}):([0-9]{2}):([0-9]{2}) ([0-9]{2}):([0-9]{2}):([0-9]{2})")
            .expect("datetime pattern is valid")
    })
}

/// First calendar-valid capture time in byte order, if any.
pub fn extract_timestamp(bytes: &[u8]) -> Option<CaptureTimestamp> {
    bytes.split(|b| *b == b'\n').find_map(scan_line)
}

/// Same as [`extract_timestamp`], reading the file as a stream of lines so
/// the scan stops as soon as a match is found.
pub fn read_capture_timestamp(path: &Path) -> Result<Option<CaptureTimestamp>> {
    let file = File::open(path)
        .with_context(|| format!("could not open photo for scanning: {}", path.display()))?;
    let reader = BufReader::new(file);

    for line in reader.split(b'\n') {
        let line =
            line.with_context(|| format!("could not read photo contents: {}", path.display()))?;
        if let Some(timestamp) = scan_line(&line) {
            return Ok(Some(timestamp));
        }
    }

    Ok(None)
}

fn scan_line(line: &[u8]) -> Option<CaptureTimestamp> {
    datetime_pattern()
        .captures_iter(line)
        .find_map(|caps| to_timestamp(&caps))
}

fn to_timestamp(caps: &Captures<'_>) -> Option<CaptureTimestamp> {
    let field = |index: usize| -> Option<u32> {
        let raw = caps.get(index)?.as_bytes();
        std::str::from_utf8(raw).ok()?.parse().ok()
    };

    CaptureTimestamp::from_parts(
        i32::try_from(field(1)?).ok()?,
        field(2)?,
        field(3)?,
        field(4)?,
        field(5)?,
        field(6)?,
    )
}

#[cfg(test)]
mod tests {
    use super::{extract_timestamp, read_capture_timestamp};
    use std::fs;
    use tempfile::tempdir;

    fn jpeg_like(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10, b'E', b'x', b'i', b'f', 0, 0];
        bytes.extend_from_slice(&[0x80, 0xFE, 0xC3, 0x28, b'\n', 0xA0, 0xA1]);
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[0x00, 0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn extracts_every_component_and_compact_form() {
        let ts = extract_timestamp(&jpeg_like(b"2014:06:15 10:30:45")).expect("timestamp");
        assert_eq!(ts.year(), 2014);
        assert_eq!(ts.month(), 6);
        assert_eq!(ts.day(), 15);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);
        assert_eq!(ts.second(), 45);
        assert_eq!(ts.compact(), "20140615103045");
    }

    #[test]
    fn earliest_match_in_byte_order_wins() {
        let bytes = jpeg_like(b"2013:01:01 00:00:00\n\xFF\xFE2015:02:02 12:00:00");
        let ts = extract_timestamp(&bytes).expect("timestamp");
        assert_eq!(ts.compact(), "20130101000000");
    }

    #[test]
    fn returns_none_without_a_match() {
        assert!(extract_timestamp(&jpeg_like(b"no capture time here")).is_none());
        assert!(extract_timestamp(&[]).is_none());
    }

    #[test]
    fn requires_exact_field_layout() {
        assert!(extract_timestamp(b"2014-06-15 10:30:45").is_none());
        assert!(extract_timestamp(b"2014:06:15T10:30:45").is_none());
        assert!(extract_timestamp(b"2014:6:15 10:30:45").is_none());
        assert!(extract_timestamp(b"2014:06:15\n10:30:45").is_none());
    }

    #[test]
    fn skips_placeholder_and_invalid_dates() {
        let bytes = jpeg_like(b"0000:00:00 00:00:00 2014:13:01 00:00:00 2014:06:15 10:30:45");
        let ts = extract_timestamp(&bytes).expect("valid timestamp after placeholders");
        assert_eq!(ts.compact(), "20140615103045");
    }

    #[test]
    fn finds_match_embedded_in_binary_without_separators() {
        let bytes = jpeg_like(b"\x00\x012011:11:11 11:11:11\x00");
        assert_eq!(
            extract_timestamp(&bytes).map(|ts| ts.compact()),
            Some("20111111111111".to_string())
        );
    }

    #[test]
    fn read_capture_timestamp_reads_from_disk() {
        let temp = tempdir().expect("tempdir");
        let dated = temp.path().join("dated.jpg");
        let undated = temp.path().join("undated.jpg");
        fs::write(&dated, jpeg_like(b"2014:06:15 10:30:45")).expect("write dated");
        fs::write(&undated, jpeg_like(b"nothing")).expect("write undated");

        let ts = read_capture_timestamp(&dated)
            .expect("read dated")
            .expect("timestamp present");
        assert_eq!(ts.compact(), "20140615103045");
        assert!(read_capture_timestamp(&undated)
            .expect("read undated")
            .is_none());
    }

    #[test]
    fn read_capture_timestamp_reports_missing_file() {
        let temp = tempdir().expect("tempdir");
        let err = read_capture_timestamp(&temp.path().join("missing.jpg"))
            .expect_err("missing file should fail");
        assert!(err.to_string().contains("could not open photo for scanning"));
    }
}
