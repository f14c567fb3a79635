use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Relative to the uploads root.
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    pub resident_id: Option<Uuid>,
    pub resident_name: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Name the file was stored under, used for downloads.
    pub fn file_name(&self) -> &str {
        self.file_path.rsplit('/').next().unwrap_or(&self.file_path)
    }
}

pub fn validate_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("title is required.".into());
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(format!("title must be at most {TITLE_MAX_CHARS} characters."));
    }
    Ok(title.to_string())
}

pub fn validate_video(bytes: &[u8], max_bytes: usize) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("file is required.".into());
    }
    if bytes.len() > max_bytes {
        return Err(format!("file must be at most {max_bytes} bytes."));
    }
    Ok(())
}

/// Keeps the last path segment of a client filename and replaces anything
/// outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "video".into()
    } else {
        cleaned.chars().take(120).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_are_trimmed_and_bounded() {
        assert_eq!(validate_title("  Garden walk ").unwrap(), "Garden walk");
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(TITLE_MAX_CHARS)).is_ok());
        assert!(validate_title(&"x".repeat(TITLE_MAX_CHARS + 1)).is_err());
    }

    #[test]
    fn empty_or_oversized_files_are_rejected() {
        assert!(validate_video(b"\x00\x00\x00\x18ftypmp42", 1024).is_ok());
        assert!(validate_video(b"", 1024).is_err());
        assert!(validate_video(b"0123456789", 4).is_err());
    }

    #[test]
    fn filenames_lose_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\clips\\day one.mp4"), "day_one.mp4");
        assert_eq!(sanitize_filename("..mp4"), "mp4");
        assert_eq!(sanitize_filename(""), "video");
        assert_eq!(sanitize_filename("/"), "video");
    }
}
