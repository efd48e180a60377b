//! Filename derivation and sanitisation.
//!
//! Everything here is pure: the download code asks for a [`MediumTarget`]
//! and only then touches the network and disk.

use crate::error::{Error, Result};
use crate::media::MediumKind;

/// Extension appended to derived video filenames.
pub const VIDEO_EXTENSION: &str = ".mp4";

/// Prefix of names the platform already assigns to its media.
const NATIVE_PREFIX: &str = "tumblr";

/// Where a resolved medium is fetched from and the file it is stored as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediumTarget {
    pub file_name: String,
    pub fetch_url: String,
}

/// Map a resolved URL to the file it is saved as and the URL it is fetched from.
///
/// Photos are fetched from the resolved URL as is. Videos are fetched from
/// `video_host` under their derived name.
pub fn medium_target(kind: MediumKind, url: &str, video_host: &str) -> Result<MediumTarget> {
    match kind {
        MediumKind::Photo => {
            let file_name = sanitize_filename(&url_file_name(url))?;
            Ok(MediumTarget {
                file_name,
                fetch_url: url.to_string(),
            })
        }
        MediumKind::Video => {
            let file_name = sanitize_filename(&video_file_name(url))?;
            let fetch_url = format!("{}/{}", video_host.trim_end_matches('/'), file_name);
            Ok(MediumTarget {
                file_name,
                fetch_url,
            })
        }
    }
}

/// Last path segment of a URL with any query string removed.
pub fn url_file_name(url: &str) -> String {
    let last = url.rsplit('/').next().unwrap_or(url);
    last.split('?').next().unwrap_or(last).to_string()
}

/// Derive the CDN filename of a video URL.
///
/// Names that do not start with the platform prefix are qualified with the
/// path segment in front of them, then the video extension is added.
pub fn video_file_name(url: &str) -> String {
    let mut name = url_file_name(url);

    if !name.starts_with(NATIVE_PREFIX) {
        let path = url.split('?').next().unwrap_or(url);
        let parent = path.rsplit('/').nth(1).unwrap_or("");
        name = format!("{}_{}", parent, name);
    }

    if !name.ends_with(VIDEO_EXTENSION) {
        name.push_str(VIDEO_EXTENSION);
    }

    name
}

/// Characters replaced with `_` in every stored name.
fn is_reserved(c: char) -> bool {
    matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

/// Shared checks for names that become a single path component.
fn sanitize_component(name: &str, what: &str, replace_separators: bool) -> Result<String> {
    let rejected = if name.contains("..") {
        Some("path traversal")
    } else if name.contains('\0') {
        Some("null byte")
    } else if !replace_separators && name.contains(['/', '\\']) {
        Some("path separator")
    } else {
        None
    };
    if let Some(reason) = rejected {
        return Err(Error::InvalidFilename(format!("{} in {} '{}'", reason, what, name)));
    }

    let sanitized: String = name
        .chars()
        .map(|c| if is_reserved(c) || c == '/' || c == '\\' { '_' } else { c })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(format!("empty {}", what)));
    }

    Ok(sanitized)
}

/// Check a derived filename, replacing characters the filesystem may refuse.
///
/// Traversal, separators and NUL are errors so a name can never leave its folder.
pub fn sanitize_filename(name: &str) -> Result<String> {
    sanitize_component(name, "filename", false)
}

/// Sanitize a folder name such as an account.
///
/// Separators are replaced rather than rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    sanitize_component(name, "folder name", true)
}
