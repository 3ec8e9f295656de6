//! Upload checks: declared size range, sniffed MIME type, sniffed extension.
//!
//! These checks can fail to evaluate (bad size string, unreadable stream),
//! which is reported as an [`UploadError`] rather than `Ok(false)`.
//!
//! ```rust,ignore
//! use vtag::upload::{validate_upload_size, validate_upload_mime, MemoryFile};
//!
//! let avatar = MemoryFile::new("avatar.png", bytes);
//! assert!(validate_upload_size(&avatar, "1KB", "3MB")?);
//! assert!(validate_upload_mime(&avatar, &["image/png", "image/jpeg"])?);
//! ```

use crate::sniff::{self, Detected};
use bytesize::ByteSize;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Number of leading bytes read for content sniffing.
pub const DEFAULT_SNIFF_LEN: usize = 512;

/// Largest sniff window accepted from configuration.
pub const MAX_SNIFF_LIMIT: usize = 1024 * 1024;

/// Errors raised while evaluating an upload check.
#[derive(Debug, Error)]
pub enum UploadError {
    /// A min/max size string could not be parsed.
    #[error("invalid size '{value}': {reason}")]
    InvalidSize { value: String, reason: String },

    /// The upload could not be opened or read.
    #[error("failed to read upload: {0}")]
    Io(#[from] io::Error),
}

/// A file-like upload with a declared size and re-openable content.
///
/// Every check opens its own reader and drops it before returning, so the
/// content can still be read in full afterwards.
pub trait UploadedFile {
    /// Declared size in bytes.
    fn size(&self) -> u64;

    /// Open a fresh reader positioned at the start of the content.
    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// An upload held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    content: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Client-supplied file name. Not used by any check.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl UploadedFile for MemoryFile {
    fn size(&self) -> u64 {
        self.content.len() as u64
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(Cursor::new(self.content.as_slice())))
    }
}

/// An upload spooled to disk.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    size: u64,
}

impl DiskFile {
    /// Reference a file on disk, taking its size from the file metadata.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let size = std::fs::metadata(&path)?.len();
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UploadedFile for DiskFile {
    fn size(&self) -> u64 {
        self.size
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// Parse a size string such as `"512B"`, `"1KB"` or `"1.5MB"`.
///
/// Units are binary whether or not the `i` is spelled out: `"1KB"` and
/// `"1KiB"` are both 1024 bytes. A bare number is a byte count.
pub fn parse_size(value: &str) -> Result<u64, UploadError> {
    let invalid = |reason: String| UploadError::InvalidSize {
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let multiple = unit_multiple(unit.trim())
        .ok_or_else(|| invalid(format!("unknown unit '{}'", unit.trim())))?;

    if let Ok(whole) = number.parse::<u64>() {
        return whole
            .checked_mul(multiple)
            .ok_or_else(|| invalid("size does not fit in 64 bits".to_string()));
    }

    let fractional: f64 = number
        .parse()
        .map_err(|_| invalid(format!("'{number}' is not a number")))?;
    let bytes = fractional * multiple as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(invalid("size does not fit in 64 bits".to_string()));
    }
    Ok(bytes as u64)
}

fn unit_multiple(unit: &str) -> Option<u64> {
    let multiple = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => bytesize::B,
        "k" | "kb" | "kib" => bytesize::KIB,
        "m" | "mb" | "mib" => bytesize::MIB,
        "g" | "gb" | "gib" => bytesize::GIB,
        "t" | "tb" | "tib" => bytesize::TIB,
        "p" | "pb" | "pib" => bytesize::PIB,
        _ => return None,
    };
    Some(multiple)
}

/// Check that the declared size lies within `min..=max`.
pub fn validate_upload_size<F>(file: &F, min: &str, max: &str) -> Result<bool, UploadError>
where
    F: UploadedFile + ?Sized,
{
    let min = parse_size(min)?;
    let max = parse_size(max)?;
    let size = file.size();
    tracing::trace!(
        size = %ByteSize::b(size),
        min = %ByteSize::b(min),
        max = %ByteSize::b(max),
        "checking upload size"
    );
    Ok(size >= min && size <= max)
}

/// Sniff the content type from at most `limit` leading bytes.
pub fn sniff<F>(file: &F, limit: usize) -> Result<Detected, UploadError>
where
    F: UploadedFile + ?Sized,
{
    let mut buf = Vec::with_capacity(limit.min(DEFAULT_SNIFF_LEN));
    file.open()?.take(limit as u64).read_to_end(&mut buf)?;

    let detected = sniff::detect(&buf);
    tracing::debug!(
        read = buf.len(),
        mime = detected.mime,
        extension = detected.extension,
        "sniffed upload content"
    );
    Ok(detected)
}

/// Check the sniffed MIME type against an allow-list (exact match).
pub fn validate_upload_mime<F>(file: &F, mimes: &[&str]) -> Result<bool, UploadError>
where
    F: UploadedFile + ?Sized,
{
    validate_upload_mime_with_limit(file, mimes, DEFAULT_SNIFF_LEN)
}

/// [`validate_upload_mime`] with an explicit sniff window.
pub fn validate_upload_mime_with_limit<F>(
    file: &F,
    mimes: &[&str],
    limit: usize,
) -> Result<bool, UploadError>
where
    F: UploadedFile + ?Sized,
{
    let detected = sniff(file, limit)?;
    Ok(mimes.iter().any(|m| m.trim() == detected.mime))
}

/// Check the sniffed extension against an allow-list.
///
/// Comparison ignores case and a leading dot, so `"PNG"`, `".png"` and
/// `"png"` are equivalent.
pub fn validate_upload_ext<F>(file: &F, exts: &[&str]) -> Result<bool, UploadError>
where
    F: UploadedFile + ?Sized,
{
    validate_upload_ext_with_limit(file, exts, DEFAULT_SNIFF_LEN)
}

/// [`validate_upload_ext`] with an explicit sniff window.
pub fn validate_upload_ext_with_limit<F>(
    file: &F,
    exts: &[&str],
    limit: usize,
) -> Result<bool, UploadError>
where
    F: UploadedFile + ?Sized,
{
    let detected = sniff(file, limit)?;
    if detected.extension.is_empty() {
        return Ok(false);
    }

    Ok(exts.iter().any(|ext| {
        ext.trim()
            .trim_start_matches('.')
            .eq_ignore_ascii_case(detected.extension)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";

    #[test]
    fn size_in_range() {
        let file = MemoryFile::new("a.bin", vec![0u8; 2048]);
        assert!(validate_upload_size(&file, "1KB", "3MB").unwrap());

        let tiny = MemoryFile::new("b.bin", vec![0u8; 10]);
        assert!(!validate_upload_size(&tiny, "1KB", "3MB").unwrap());
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let file = MemoryFile::new("a.bin", vec![0u8; 1024]);
        assert!(validate_upload_size(&file, "1024B", "1KB").unwrap());
    }

    #[test]
    fn size_units_are_binary() {
        let just_under = MemoryFile::new("a.bin", vec![0u8; 1023]);
        assert!(!validate_upload_size(&just_under, "1KB", "3MB").unwrap());

        let at_cap = MemoryFile::new("b.bin", vec![0u8; 3_145_728]);
        assert!(validate_upload_size(&at_cap, "1KB", "3MB").unwrap());

        let over_cap = MemoryFile::new("c.bin", vec![0u8; 3_145_729]);
        assert!(!validate_upload_size(&over_cap, "1KB", "3MB").unwrap());
    }

    #[test]
    fn invalid_size_is_an_error_not_false() {
        let file = MemoryFile::new("a.bin", vec![0u8; 2048]);

        let err = validate_upload_size(&file, "1XB", "3MB").unwrap_err();
        assert!(matches!(err, UploadError::InvalidSize { ref value, .. } if value == "1XB"));

        let err = validate_upload_size(&file, "1KB", "").unwrap_err();
        assert!(matches!(err, UploadError::InvalidSize { .. }));
    }

    #[test]
    fn fractional_sizes() {
        assert_eq!(parse_size("1.5MB").unwrap(), 1_572_864);
        assert_eq!(parse_size("0.5 KB").unwrap(), 512);
        assert!(matches!(
            parse_size("1..5MB"),
            Err(UploadError::InvalidSize { .. })
        ));
    }

    #[test]
    fn oversized_values_are_errors() {
        assert!(matches!(
            parse_size("20000000PB"),
            Err(UploadError::InvalidSize { .. })
        ));
    }

    #[test]
    fn parse_size_units() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size("2 MB").unwrap(), 2_097_152);
        assert_eq!(parse_size("1kb").unwrap(), 1024);
        assert_eq!(parse_size("1GB").unwrap(), 1 << 30);
    }

    #[test]
    fn mime_allow_list() {
        let file = MemoryFile::new("avatar.png", PNG);
        assert!(validate_upload_mime(&file, &["image/jpeg", "image/png"]).unwrap());
        assert!(!validate_upload_mime(&file, &["image/jpeg"]).unwrap());
        // exact, case-sensitive match
        assert!(!validate_upload_mime(&file, &["IMAGE/PNG"]).unwrap());
    }

    #[test]
    fn mime_ignores_file_name() {
        let file = MemoryFile::new("avatar.png", b"just some text".to_vec());
        assert!(!validate_upload_mime(&file, &["image/png"]).unwrap());
        assert!(validate_upload_mime(&file, &["text/plain"]).unwrap());
    }

    #[test]
    fn extension_allow_list() {
        let file = MemoryFile::new("avatar", PNG);
        assert!(validate_upload_ext(&file, &["PNG"]).unwrap());
        assert!(validate_upload_ext(&file, &[".png"]).unwrap());
        assert!(!validate_upload_ext(&file, &["jpg", "gif"]).unwrap());
    }

    #[test]
    fn unknown_binary_has_no_extension() {
        let file = MemoryFile::new("blob", vec![0u8, 1, 2, 3, 4]);
        assert!(!validate_upload_ext(&file, &["", "bin"]).unwrap());
    }

    #[test]
    fn sniff_window_is_bounded() {
        // The PDF marker sits past a 4-byte window.
        let mut content = b"    ".to_vec();
        content.extend_from_slice(b"%PDF-1.4");
        let file = MemoryFile::new("doc", content);
        let detected = sniff(&file, 4).unwrap();
        assert_eq!(detected.mime, "text/plain");
    }

    #[test]
    fn unbounded_window_reads_whole_small_file() {
        let file = MemoryFile::new("avatar.png", PNG);
        let detected = sniff(&file, usize::MAX).unwrap();
        assert_eq!(detected.mime, "image/png");
        assert!(validate_upload_ext_with_limit(&file, &["png"], usize::MAX).unwrap());
    }

    #[test]
    fn content_readable_after_check() {
        let file = MemoryFile::new("avatar.png", PNG);
        assert!(validate_upload_mime(&file, &["image/png"]).unwrap());

        let mut all = Vec::new();
        file.open().unwrap().read_to_end(&mut all).unwrap();
        assert_eq!(all, PNG);
    }

    #[test]
    fn disk_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%binary").unwrap();
        tmp.flush().unwrap();

        let file = DiskFile::from_path(tmp.path()).unwrap();
        assert_eq!(file.size(), 16);
        assert!(validate_upload_mime(&file, &["application/pdf"]).unwrap());
        assert!(validate_upload_ext(&file, &["pdf"]).unwrap());
        assert!(validate_upload_size(&file, "1B", "1KB").unwrap());
    }

    #[test]
    fn missing_disk_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DiskFile::from_path(dir.path().join("missing")).is_err());
    }
}
