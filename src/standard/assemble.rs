use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::model::{Requirement, RequirementMap};
use crate::text::normalize_whitespace;

/// One processed segment waiting to be merged into its requirement.
#[derive(Debug, Clone)]
pub(crate) struct AssemblySegment {
    pub(crate) code: String,
    pub(crate) full_designation: String,
    pub(crate) full_text: String,
    pub(crate) sub_points: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct RequirementAssembler {
    dot_leader_tail: Regex,
    section_headings: Regex,
    application_requirements: Regex,
    enumeration_token: Regex,
    back_matter: Regex,
}

impl RequirementAssembler {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            dot_leader_tail: Regex::new(r"\s*\.{2,}\s*\d*\s*$")
                .context("failed to compile dot leader regex")?,
            section_headings: Regex::new(
                r"(?i)Metrics\s+and\s+targets|Impact,\s+risk\s+and\s+opportunity\s+management|Parameter\s+und\s+Ziele|Management\s+der\s+Auswirkungen,\s+Risiken\s+und\s+Chancen",
            )
            .context("failed to compile section heading regex")?,
            application_requirements: Regex::new(r"(?i)APPLICATION\s+REQUIREMENTS")
                .context("failed to compile application requirements regex")?,
            enumeration_token: Regex::new(r"(?:^|\s)(\d{1,2}\.|\([a-z]\)|[a-z]\.)\s")
                .context("failed to compile enumeration token regex")?,
            back_matter: Regex::new(r"(?i)\b(?:Appendix|Glossar|Definitions|Contact|Imprint)")
                .context("failed to compile back matter regex")?,
        })
    }

    /// Merges segments by code, first occurrence first, then cleans every
    /// record. Only the requirement of the final segment has back matter
    /// trimmed.
    pub(crate) fn assemble(&self, segments: Vec<AssemblySegment>) -> RequirementMap {
        let mut requirements = RequirementMap::default();
        let last_code = segments.last().map(|segment| segment.code.clone());

        for segment in segments {
            let record = requirements.entry_or_insert(Requirement {
                code: segment.code,
                full_text: String::new(),
                sub_points: Vec::new(),
                full_designation: segment.full_designation,
            });

            if !segment.full_text.is_empty() {
                if !record.full_text.is_empty() {
                    record.full_text.push(' ');
                }
                record.full_text.push_str(&segment.full_text);
            }
            record.sub_points.extend(segment.sub_points);
        }

        for record in requirements.iter_mut() {
            record.full_text = self.clean_full_text(&record.full_text, &record.full_designation);
            record.sub_points = record
                .sub_points
                .iter()
                .filter_map(|sub_point| self.clean_sub_point(sub_point))
                .collect();
        }

        if let Some(record) = last_code.and_then(|code| requirements.get_mut(&code)) {
            let trimmed = self.trim_back_matter(&record.full_text);
            if trimmed.len() != record.full_text.len() {
                debug!(code = %record.code, "trimmed back matter from final requirement");
            }
            record.full_text = trimmed;
        }

        requirements
    }

    pub(crate) fn clean_full_text(&self, text: &str, designation: &str) -> String {
        let text = self.dot_leader_tail.replace(text, "");
        let text = self.section_headings.replace_all(&text, " ");
        let text = self.truncate_application_requirements(&text);

        let first_item = self
            .enumeration_token
            .captures_iter(text)
            .filter_map(|captures| captures.get(1))
            .find(|token| !is_spaced_abbreviation(text, token.start(), token.end()));

        let text = match first_item {
            Some(token) => text[token.start()..].to_string(),
            None => drop_repeated(text, designation),
        };

        normalize_whitespace(&text)
    }

    pub(crate) fn clean_sub_point(&self, sub_point: &str) -> Option<String> {
        let text = self.section_headings.replace_all(sub_point, " ");
        let text = normalize_whitespace(self.truncate_application_requirements(&text));
        (!text.is_empty()).then_some(text)
    }

    pub(crate) fn trim_back_matter(&self, text: &str) -> String {
        match self.back_matter.find(text) {
            Some(found) => text[..found.start()].trim_end().to_string(),
            None => text.to_string(),
        }
    }

    fn truncate_application_requirements<'t>(&self, text: &'t str) -> &'t str {
        match self.application_requirements.find(text) {
            Some(found) => &text[..found.start()],
            None => text,
        }
    }
}

/// True for a letter token such as `z.` in "z. B." or `u.` in "u. a.".
fn is_spaced_abbreviation(text: &str, start: usize, end: usize) -> bool {
    if !text[start..end].starts_with(|character: char| character.is_ascii_lowercase()) {
        return false;
    }

    let before = text[..start].split_whitespace().next_back();
    let after = text[end..].split_whitespace().next();
    [before, after]
        .into_iter()
        .flatten()
        .any(is_single_letter_abbreviation)
}

fn is_single_letter_abbreviation(word: &str) -> bool {
    let mut characters = word.chars();
    characters.next().is_some_and(char::is_alphabetic)
        && characters.next() == Some('.')
        && characters.all(|character| character.is_ascii_punctuation())
}

/// Keeps the first occurrence of `needle` and removes the rest.
fn drop_repeated(text: &str, needle: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }

    let Some(first) = text.find(needle) else {
        return text.to_string();
    };

    let keep_end = first + needle.len();
    let rest = text[keep_end..].replace(needle, " ");
    format!("{}{rest}", &text[..keep_end])
}
