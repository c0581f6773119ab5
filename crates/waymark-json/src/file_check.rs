//! File-level preconditions for guide imports.
//!
//! These checks run before any content is read: size cap and a
//! name/MIME sniff that the file plausibly holds JSON. Pure functions,
//! no I/O — the caller supplies the metadata.

/// Maximum accepted import size: 1 MiB.
pub const MAX_IMPORT_FILE_BYTES: u64 = 1024 * 1024;

/// Metadata of a candidate import file.
#[derive(Debug, Clone)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub mime: Option<String>,
}

impl FileMeta {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Outcome of the file-level checks.
#[derive(Debug, Clone)]
pub struct FileCheck {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check size and JSON-ness of a candidate file.
pub fn validate_file(meta: &FileMeta) -> FileCheck {
    let mut errors = Vec::new();

    if meta.size > MAX_IMPORT_FILE_BYTES {
        errors.push(format!(
            "File is too large ({} bytes): guide imports are limited to 1MB",
            meta.size
        ));
    }

    let name_is_json = meta.name.to_ascii_lowercase().ends_with(".json");
    let mime_is_json = meta
        .mime
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("application/json"));
    if !name_is_json && !mime_is_json {
        errors.push(format!(
            "'{}' does not look like a guide export: a .json file (or application/json content) is required",
            meta.name
        ));
    }

    FileCheck {
        is_valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_small_json_file() {
        let check = validate_file(&FileMeta::new("guide.json", 10 * 1024));
        assert!(check.is_valid);
        assert!(check.errors.is_empty());
    }

    #[test]
    fn rejects_oversized_file() {
        let check = validate_file(&FileMeta::new("guide.json", 2 * 1024 * 1024));
        assert!(!check.is_valid);
        assert!(check.errors[0].contains("1MB"));
    }

    #[test]
    fn rejects_non_json_name_without_mime() {
        let check = validate_file(&FileMeta::new("guide.txt", 10 * 1024));
        assert!(!check.is_valid);
        assert!(check.errors[0].contains(".json"));
    }

    #[test]
    fn mime_type_rescues_odd_names() {
        let meta = FileMeta::new("export", 512).with_mime("application/json");
        assert!(validate_file(&meta).is_valid);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(validate_file(&FileMeta::new("GUIDE.JSON", 512)).is_valid);
    }
}
