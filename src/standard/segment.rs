use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::model::StandardType;

use super::enrich::{enrich_esrs, enrich_gri};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartKind {
    Overview,
    Numeric,
    Letter,
    Roman,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SegmentPart {
    pub(crate) kind: PartKind,
    pub(crate) label: String,
    pub(crate) text: String,
}

impl SegmentPart {
    fn new(kind: PartKind, label: &str, body: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            text: body.trim().to_string(),
        }
    }

    fn append(&mut self, line: &str) {
        if self.text.is_empty() {
            self.text = line.to_string();
        } else {
            self.text.push(' ');
            self.text.push_str(line);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessedSegment {
    pub(crate) full_text: String,
    pub(crate) sub_points: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum LineEvent<'a> {
    Item {
        kind: PartKind,
        label: &'a str,
        body: &'a str,
    },
    FootnoteStart,
    Plain(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Accumulating,
    InFootnote,
}

/// Splits one requirement segment into its title and enumerated parts.
#[derive(Debug)]
pub(crate) struct SegmentProcessor {
    numeric_item: Regex,
    letter_item: Regex,
    roman_item: Regex,
    footnote_start: Regex,
    application_requirements: Regex,
    amendment_note: Regex,
    gri_explanatory: Regex,
}

impl SegmentProcessor {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            numeric_item: Regex::new(r"^(?P<label>\d{1,2})\.(?:\s+(?P<body>.*))?$")
                .context("failed to compile numeric item regex")?,
            letter_item: Regex::new(
                r"^(?:\((?P<paren>[a-z])\)|(?P<dot>[a-z])\.)(?:\s+(?P<body>.*))?$",
            )
            .context("failed to compile letter item regex")?,
            roman_item: Regex::new(
                r"^(?:\((?P<paren>[ivx]+)\)|(?P<dot>[ivx]+)\.)(?:\s+(?P<body>.*))?$",
            )
            .context("failed to compile roman item regex")?,
            footnote_start: Regex::new(r"^\d+\s+\S").context("failed to compile footnote regex")?,
            application_requirements: Regex::new(r"(?i)APPLICATION\s+REQUIREMENTS")
                .context("failed to compile application requirements regex")?,
            amendment_note: Regex::new(r"\(\d{1,3}(?:\s*[-–,]\s*\d{1,3})*\s+amended\)")
                .context("failed to compile amendment note regex")?,
            gri_explanatory: Regex::new(
                r"(?i)Compilation\s+requirements|Erläuterungen|Hintergrundinformationen",
            )
            .context("failed to compile GRI guidance regex")?,
        })
    }

    pub(crate) fn process(&self, segment: &str, standard_type: StandardType) -> ProcessedSegment {
        let prepared = self.prepare(segment, standard_type);
        let parts = self.split_parts(&prepared, standard_type);

        match standard_type {
            StandardType::Esrs => ProcessedSegment {
                full_text: parts
                    .iter()
                    .map(render_labelled)
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<String>>()
                    .join(" "),
                sub_points: enrich_esrs(&parts),
            },
            StandardType::Gri => ProcessedSegment {
                full_text: parts
                    .iter()
                    .filter(|part| part.kind == PartKind::Overview)
                    .map(|part| part.text.as_str())
                    .collect::<Vec<&str>>()
                    .join(" "),
                sub_points: enrich_gri(&parts),
            },
        }
    }

    /// Cuts guidance material off the end of a segment.
    pub(crate) fn prepare(&self, segment: &str, standard_type: StandardType) -> String {
        let mut text = segment;
        if let Some(found) = self.application_requirements.find(text) {
            text = &text[..found.start()];
        }

        match standard_type {
            StandardType::Esrs => self.amendment_note.replace_all(text, "").into_owned(),
            StandardType::Gri => match self.gri_explanatory.find(text) {
                Some(found) => text[..found.start()].to_string(),
                None => text.to_string(),
            },
        }
    }

    pub(crate) fn split_parts(&self, text: &str, standard_type: StandardType) -> Vec<SegmentPart> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let Some(title) = lines.next() else {
            return Vec::new();
        };

        // The anchor heading is always the overview, even when it starts with a number.
        let mut parts = vec![SegmentPart::new(PartKind::Overview, "", title)];
        let mut last_letter = None;
        let mut state = ScanState::Accumulating;

        for line in lines {
            match (state, self.classify_line(line, standard_type, last_letter)) {
                (_, LineEvent::Item { kind, label, body }) => {
                    match kind {
                        PartKind::Numeric => last_letter = None,
                        PartKind::Letter => last_letter = label.chars().next(),
                        PartKind::Overview | PartKind::Roman => {}
                    }
                    parts.push(SegmentPart::new(kind, label, body));
                    state = ScanState::Accumulating;
                }
                (ScanState::InFootnote, _) => {}
                (ScanState::Accumulating, LineEvent::FootnoteStart) => {
                    debug!(line, "skipping footnote");
                    state = ScanState::InFootnote;
                }
                (ScanState::Accumulating, LineEvent::Plain(line)) => {
                    if let Some(current) = parts.last_mut() {
                        current.append(line);
                    }
                }
            }
        }

        parts
    }

    fn classify_line<'a>(
        &self,
        line: &'a str,
        standard_type: StandardType,
        last_letter: Option<char>,
    ) -> LineEvent<'a> {
        if standard_type == StandardType::Esrs {
            if let Some(captures) = self.numeric_item.captures(line) {
                return LineEvent::Item {
                    kind: PartKind::Numeric,
                    label: captures.name("label").map_or("", |found| found.as_str()),
                    body: captures.name("body").map_or("", |found| found.as_str()),
                };
            }
        }

        let letter = self.letter_item.captures(line);
        let roman = self.roman_item.captures(line);

        let kind = match (&letter, &roman) {
            (Some(_), Some(captures)) => {
                let label = item_label(captures);
                if label.len() == 1 && reads_as_letter(label, last_letter) {
                    Some((PartKind::Letter, captures))
                } else {
                    Some((PartKind::Roman, captures))
                }
            }
            (Some(captures), None) => Some((PartKind::Letter, captures)),
            (None, Some(captures)) => Some((PartKind::Roman, captures)),
            (None, None) => None,
        };

        if let Some((kind, captures)) = kind {
            return LineEvent::Item {
                kind,
                label: item_label(captures),
                body: captures.name("body").map_or("", |found| found.as_str()),
            };
        }

        if self.footnote_start.is_match(line) {
            return LineEvent::FootnoteStart;
        }

        LineEvent::Plain(line)
    }
}

fn item_label<'a>(captures: &regex::Captures<'a>) -> &'a str {
    captures
        .name("paren")
        .or_else(|| captures.name("dot"))
        .map_or("", |found| found.as_str())
}

/// A lone `i`, `v` or `x` is a letter when it continues the letter
/// sequence or when no letter item is open yet.
fn reads_as_letter(label: &str, last_letter: Option<char>) -> bool {
    let Some(candidate) = label.chars().next() else {
        return false;
    };

    match last_letter {
        None => true,
        Some(previous) => char::from_u32(previous as u32 + 1) == Some(candidate),
    }
}

fn render_labelled(part: &SegmentPart) -> String {
    let label = match part.kind {
        PartKind::Overview => return part.text.clone(),
        PartKind::Numeric => format!("{}.", part.label),
        PartKind::Letter | PartKind::Roman => format!("({})", part.label),
    };

    if part.text.is_empty() {
        label
    } else {
        format!("{label} {}", part.text)
    }
}
