use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::semantic::SemanticModelConfig;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum StandardType {
    #[serde(rename = "ESRS")]
    Esrs,
    #[serde(rename = "GRI")]
    Gri,
}

impl StandardType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esrs => "ESRS",
            Self::Gri => "GRI",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum DetectedStandard {
    #[serde(rename = "ESRS")]
    Esrs,
    #[serde(rename = "GRI")]
    Gri,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DetectedStandard {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esrs => "ESRS",
            Self::Gri => "GRI",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub code: String,
    pub full_text: String,
    pub sub_points: Vec<String>,
    pub full_designation: String,
}

/// Requirements keyed by code, in order of each code's first anchor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementMap {
    entries: Vec<Requirement>,
    index: HashMap<String, usize>,
}

impl RequirementMap {
    pub fn get(&self, code: &str) -> Option<&Requirement> {
        self.index.get(code).map(|position| &self.entries[*position])
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Requirement> {
        let position = *self.index.get(code)?;
        self.entries.get_mut(position)
    }

    /// Returns the existing record for `code`, or inserts `seed` at the end.
    pub fn entry_or_insert(&mut self, seed: Requirement) -> &mut Requirement {
        let position = match self.index.get(&seed.code) {
            Some(position) => *position,
            None => {
                self.index.insert(seed.code.clone(), self.entries.len());
                self.entries.push(seed);
                self.entries.len() - 1
            }
        };
        &mut self.entries[position]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Requirement> {
        self.entries.iter_mut()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.code.as_str()).collect()
    }
}

impl Serialize for RequirementMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match {
    pub paragraph_index: usize,
    pub score: f64,
}

pub type MatchList = Vec<Match>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextUnit {
    pub unit_id: String,
    pub code: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedUnit {
    pub unit: TextUnit,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceDocument {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DetectionManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceDocument,
    pub threshold: f64,
    pub esrs_score: f64,
    pub gri_score: f64,
    pub detected_standard: DetectedStandard,
}

#[derive(Debug, Serialize)]
pub struct RequirementsManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceDocument,
    pub detected_standard: DetectedStandard,
    pub requirement_count: usize,
    pub sub_point_count: usize,
    pub requirements: RequirementMap,
}

#[derive(Debug, Serialize)]
pub struct ParagraphsManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceDocument,
    pub min_words: usize,
    pub min_chars: usize,
    pub noise_filter: bool,
    pub paragraph_count: usize,
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchedParagraph {
    pub paragraph_index: usize,
    pub score: f64,
    pub paragraph: String,
}

#[derive(Debug, Serialize)]
pub struct UnitMatchReport {
    pub unit_id: String,
    pub code: Option<String>,
    pub text: String,
    pub matches: Vec<MatchedParagraph>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub standard: SourceDocument,
    pub report: SourceDocument,
    pub detected_standard: DetectedStandard,
    pub model: SemanticModelConfig,
    pub top_k: usize,
    pub min_score: f64,
    pub requirement_count: usize,
    pub unit_count: usize,
    pub paragraph_count: usize,
    pub duration_ms: u128,
    pub units: Vec<UnitMatchReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    pub unit_id: String,
    pub code: Option<String>,
    pub text: String,
    pub avg_max_score: f64,
    pub reports_covered: usize,
    pub reports_total: usize,
}

#[derive(Debug, Serialize)]
pub struct CoverageManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub standard: SourceDocument,
    pub reports: Vec<SourceDocument>,
    pub skipped_reports: Vec<String>,
    pub model: SemanticModelConfig,
    pub coverage_threshold: f64,
    pub rows: Vec<CoverageRow>,
}
