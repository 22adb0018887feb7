use std::borrow::Cow;
use std::env;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Maximum size of an uploaded document or image: 10MB
pub const MAX_UPLOAD_SIZE_BYTES: u64 = 10 * 1024 * 1024;

// Characters to percent-encode inside a single URL path segment
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Kind of file accepted by the generation endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Document,
    Image,
}

/// Encodes an identifier so it can be placed in a single URL path segment
///
/// # Examples
///
/// ```
/// use question_studio::utils::encode_path_segment;
///
/// assert_eq!(encode_path_segment("a/b c"), "a%2Fb%20c");
/// ```
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
}

/// Validates that a file's size is within the upload limit (10MB)
///
/// Takes an open file handle to avoid TOCTOU (time-of-check-time-of-use)
/// race conditions where the file could be modified between the size check
/// and the read that follows.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 10MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_UPLOAD_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_UPLOAD_SIZE_BYTES
        );
    }

    Ok(())
}

/// Returns the MIME type to send for an upload, based on the file extension
///
/// # Errors
///
/// Returns an error if the extension is not accepted for this kind of upload.
pub fn upload_mime_type(path: &Path, kind: UploadKind) -> Result<&'static str> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match (kind, extension.as_str()) {
        (UploadKind::Document, "pdf") => "application/pdf",
        (UploadKind::Image, "png") => "image/png",
        (UploadKind::Image, "jpg" | "jpeg") => "image/jpeg",
        (UploadKind::Image, "webp") => "image/webp",
        (UploadKind::Image, "gif") => "image/gif",
        (UploadKind::Document, _) => bail!("Only PDF documents are supported: {}", path.display()),
        (UploadKind::Image, _) => {
            bail!("Unsupported image type (use png, jpg, webp or gif): {}", path.display())
        }
    };

    Ok(mime)
}

/// Formats a path with ~ substitution for the home directory
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use question_studio::utils::format_path_with_tilde;
///
/// let path = PathBuf::from("/Users/alice/Documents/notes.pdf");
/// // Returns "~/Documents/notes.pdf" if HOME=/Users/alice
/// let formatted = format_path_with_tilde(&path);
/// ```
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
