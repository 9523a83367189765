use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

/// Reads the text layer of every page with `pdftotext`.
///
/// Pages without a text layer come back as empty strings; the page list keeps
/// its length so page positions stay aligned with the PDF.
pub fn extract_pages(pdf_path: &Path) -> Result<Vec<String>> {
    if !pdf_path.is_file() {
        bail!("PDF not found: {}", pdf_path.display());
    }

    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let pages = split_pages(&raw);

    debug!(
        path = %pdf_path.display(),
        pages = pages.len(),
        empty_pages = pages.iter().filter(|page| page.trim().is_empty()).count(),
        "extracted pdf text layer"
    );

    Ok(pages)
}

fn split_pages(raw: &str) -> Vec<String> {
    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    while let Some(last_page) = pages.last() {
        if last_page.trim().is_empty() {
            pages.pop();
            continue;
        }
        break;
    }

    pages
}
