use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

use crate::model::DetectedStandard;

pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.55;

const ESRS_PATTERNS: &[&str] = &[
    r"(?i)\bESRS\b",
    r"(?i)\bEFRAG\b",
    r"(?i)\bCSRD\b",
    r"(?i)\bDisclosure\s+Requirement\b",
    r"(?i)\bAngabepflicht",
    r"(?i)\b[EGST]\d{1,2}\b",
];

const GRI_PATTERNS: &[&str] = &[
    r"(?i)\bGRI\b",
    r"(?i)\bGlobal\s+Reporting\s+Initiative\b",
    r"(?i)\b\d{1,3}[-–]\d{1,2}\b",
    r"(?i)\bAngabe\s+\d{1,3}[-–]\d{1,2}\b",
    r"(?i)\bDisclosure\s+\d{1,3}[-–]\d{1,2}\b",
    r"(?i)\b(?:Universal\s+Standards|Universelle[nr]?\s+Standards)\b",
    r"(?i)\b(?:Topic\s+Standards?|Themenstandards?)\b",
    r"(?i)\b(?:Sector\s+Standards?|Branchenstandards?|Sektorstandards?)\b",
];

#[derive(Debug, Clone, Copy)]
pub struct DetectorOptions {
    pub threshold: f64,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DETECTION_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectionScores {
    pub esrs_score: f64,
    pub gri_score: f64,
    pub standard: DetectedStandard,
}

impl DetectionScores {
    pub fn unknown() -> Self {
        Self {
            esrs_score: 0.0,
            gri_score: 0.0,
            standard: DetectedStandard::Unknown,
        }
    }
}

/// Scores text against ESRS and GRI vocabulary, English and German.
#[derive(Debug)]
pub struct StandardDetector {
    esrs_patterns: Vec<Regex>,
    gri_patterns: Vec<Regex>,
}

impl StandardDetector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            esrs_patterns: compile_patterns(ESRS_PATTERNS)?,
            gri_patterns: compile_patterns(GRI_PATTERNS)?,
        })
    }

    pub fn detect(&self, text: &str, options: DetectorOptions) -> DetectionScores {
        let esrs_score = pattern_score(&self.esrs_patterns, text);
        let gri_score = pattern_score(&self.gri_patterns, text);

        DetectionScores {
            esrs_score,
            gri_score,
            standard: classify_scores(esrs_score, gri_score, options.threshold),
        }
    }
}

pub fn classify_scores(esrs_score: f64, gri_score: f64, threshold: f64) -> DetectedStandard {
    if esrs_score >= gri_score && esrs_score >= threshold {
        return DetectedStandard::Esrs;
    }

    if gri_score > esrs_score && gri_score >= threshold {
        return DetectedStandard::Gri;
    }

    DetectedStandard::Unknown
}

fn pattern_score(patterns: &[Regex], text: &str) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }

    let hits = patterns
        .iter()
        .filter(|pattern| pattern.is_match(text))
        .count();
    hits as f64 / patterns.len() as f64
}

fn compile_patterns(sources: &[&str]) -> Result<Vec<Regex>> {
    sources
        .iter()
        .map(|source| {
            Regex::new(source)
                .with_context(|| format!("failed to compile standard vocabulary regex: {source}"))
        })
        .collect()
}
