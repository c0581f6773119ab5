//! Guide import from disk and export to JSON text.
//!
//! Import composes the precondition check with the structural validator:
//! file-level findings (too large, wrong extension) surface in the same
//! report shape as content-level findings, so callers render one list.

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use waymark_api::Guide;

use crate::file_check::{validate_file, FileMeta};
use crate::validator::{parse_and_validate_guide, ValidationReport};

/// Read, check, and validate a guide file.
///
/// File-level failures (missing file, over-size, wrong extension) produce
/// a failed report without attempting to parse the content.
pub async fn import_guide_from_file(path: impl AsRef<Path>) -> ValidationReport {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let metadata = match fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "guide import failed to stat file");
            return ValidationReport::failure(vec![format!("Cannot read file '{name}': {err}")]);
        }
    };

    let check = validate_file(&FileMeta::new(name.clone(), metadata.len()));
    if !check.is_valid {
        return ValidationReport::failure(check.errors);
    }

    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "guide import failed to read file");
            return ValidationReport::failure(vec![format!("Cannot read file '{name}': {err}")]);
        }
    };

    debug!(path = %path.display(), bytes = content.len(), "imported guide file");
    parse_and_validate_guide(&content)
}

/// Serialize a guide to pretty-printed JSON for export.
pub fn guide_to_json(guide: &Guide) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(guide)?)
}

/// Write a guide to disk as pretty-printed JSON.
pub async fn export_guide_to_file(guide: &Guide, path: impl AsRef<Path>) -> anyhow::Result<()> {
    use anyhow::Context;

    let path = path.as_ref();
    let json = guide_to_json(guide)?;
    fs::write(path, json)
        .await
        .with_context(|| format!("failed to write guide to {}", path.display()))?;
    debug!(path = %path.display(), "exported guide file");
    Ok(())
}
