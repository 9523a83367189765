use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::pdf;
use crate::text::{normalize_whitespace, split_sentences, word_count};

mod noise;


use noise::*;

pub const DEFAULT_MIN_WORDS: usize = 20;
pub const DEFAULT_MIN_CHARS: usize = 100;

/// Primary segmentation needs at least this many survivors before the
/// sentence fallback is skipped.
const MIN_PRIMARY_PARAGRAPHS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphOptions {
    pub min_words: usize,
    pub min_chars: usize,
    pub noise_filter: bool,
}

impl Default for ParagraphOptions {
    fn default() -> Self {
        Self {
            min_words: DEFAULT_MIN_WORDS,
            min_chars: DEFAULT_MIN_CHARS,
            noise_filter: true,
        }
    }
}

#[derive(Debug)]
pub struct ParagraphExtractor {
    noise: NoiseFilter,
    blank_lines: Regex,
    repeated_spaces: Regex,
    paragraph_break: Regex,
}

impl ParagraphExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            noise: NoiseFilter::new()?,
            blank_lines: Regex::new(r"\n(?:[ \t]*\n)+").context("failed to compile blank line regex")?,
            repeated_spaces: Regex::new(r" +").context("failed to compile space regex")?,
            paragraph_break: Regex::new(r"\n{2,}")
                .context("failed to compile paragraph break regex")?,
        })
    }

    /// Splits report pages into substantive paragraphs in document order.
    pub fn extract(&self, pages: &[String], options: &ParagraphOptions) -> Vec<String> {
        let joined = pages.join("\n").replace("\r\n", "\n").replace('\r', "\n");
        let cleaned = self.blank_lines.replace_all(&joined, "\n\n");
        let cleaned = self.repeated_spaces.replace_all(&cleaned, " ");
        let cleaned = cleaned.trim();
        let text = cleaned.replace("-\n", "");

        let candidates = self
            .paragraph_break
            .split(&text)
            .map(normalize_whitespace)
            .collect::<Vec<String>>();
        let paragraphs = self.filter(candidates, options);
        if paragraphs.len() >= MIN_PRIMARY_PARAGRAPHS {
            return paragraphs;
        }

        warn!(
            primary_paragraphs = paragraphs.len(),
            "too few paragraphs after blank-line segmentation; regrouping sentences"
        );

        let collapsed = normalize_whitespace(cleaned);
        let grouped = group_sentences(split_sentences(&collapsed), options);
        self.filter(grouped, options)
    }

    fn filter(&self, candidates: Vec<String>, options: &ParagraphOptions) -> Vec<String> {
        candidates
            .into_iter()
            .filter(|candidate| !candidate.is_empty() && meets_length(candidate, options))
            .filter(|candidate| !(options.noise_filter && self.noise.is_noise(candidate)))
            .collect()
    }
}

fn meets_length(candidate: &str, options: &ParagraphOptions) -> bool {
    word_count(candidate) >= options.min_words && candidate.chars().count() >= options.min_chars
}

/// Greedily joins consecutive sentences until each group meets the length
/// thresholds. A short trailing group is kept for the filter to judge.
fn group_sentences(sentences: Vec<&str>, options: &ParagraphOptions) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence.trim());

        if meets_length(&current, options) {
            groups.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

pub fn extract_paragraphs(pages: &[String], options: &ParagraphOptions) -> Result<Vec<String>> {
    let extractor = ParagraphExtractor::new()?;
    Ok(extractor.extract(pages, options))
}

pub fn extract_paragraphs_from_pdf(
    pdf_path: &Path,
    options: &ParagraphOptions,
) -> Result<Vec<String>> {
    let pages = pdf::extract_pages(pdf_path)?;
    let paragraphs = extract_paragraphs(&pages, options)?;

    info!(
        path = %pdf_path.display(),
        pages = pages.len(),
        paragraphs = paragraphs.len(),
        min_words = options.min_words,
        min_chars = options.min_chars,
        noise_filter = options.noise_filter,
        "extracted report paragraphs"
    );

    Ok(paragraphs)
}
