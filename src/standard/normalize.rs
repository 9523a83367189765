use anyhow::{Context, Result};
use regex::Regex;

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|januar|februar|märz|maerz|mai|juni|juli|oktober|dezember";

/// Turns per-page text into one string with line structure intact and
/// recurring footer lines removed.
#[derive(Debug)]
pub(crate) struct PageNormalizer {
    footer_lines: Vec<Regex>,
    horizontal_space: Regex,
    line_indent: Regex,
}

impl PageNormalizer {
    pub(crate) fn new() -> Result<Self> {
        let footer_sources = [
            r"(?i)^\s*page\s*\d+\s*(?:of\s*\d+)?\s*$".to_string(),
            r"(?i)^\s*seite\s*\d+\s*(?:von\s*\d+)?\s*$".to_string(),
            r"^\s*\d+\s*$".to_string(),
            r"(?i)^\s*\[\s*draft\s*\]\s*$".to_string(),
            format!(r"(?i)^\s*(?:{MONTHS})\s+\d{{4}}\s*$"),
        ];

        let footer_lines = footer_sources
            .iter()
            .map(|source| {
                Regex::new(source)
                    .with_context(|| format!("failed to compile footer regex: {source}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        Ok(Self {
            footer_lines,
            horizontal_space: Regex::new(r"[ \t]+")
                .context("failed to compile horizontal whitespace regex")?,
            line_indent: Regex::new(r"\n[ \t]+").context("failed to compile line indent regex")?,
        })
    }

    pub(crate) fn normalize(&self, pages: &[String]) -> String {
        let joined = pages
            .iter()
            .map(|page| self.strip_footer_lines(page))
            .collect::<Vec<String>>()
            .join("\n");

        let text = joined.replace('\r', "");
        let text = self.horizontal_space.replace_all(&text, " ");
        let text = self.line_indent.replace_all(&text, "\n");
        let text = text.replace("-\n", "");

        text.trim().to_string()
    }

    pub(crate) fn strip_footer_lines(&self, page: &str) -> String {
        page.split('\n')
            .filter(|line| !self.is_footer_line(line))
            .collect::<Vec<&str>>()
            .join("\n")
    }

    fn is_footer_line(&self, line: &str) -> bool {
        self.footer_lines.iter().any(|pattern| pattern.is_match(line))
    }
}
