use std::path::Path;

use anyhow::Result;

use crate::model::SourceDocument;
use crate::util::sha256_file;

pub mod analyze;
pub mod coverage;
pub mod detect;
pub mod paragraphs;
pub mod requirements;

pub const MANIFEST_VERSION: u32 = 1;

pub fn describe_source(path: &Path) -> Result<SourceDocument> {
    Ok(SourceDocument {
        path: path.display().to_string(),
        sha256: Some(sha256_file(path)?),
    })
}

/// Shortens `text` to `max_chars` characters for terminal output.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
