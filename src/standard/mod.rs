use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::model::RequirementMap;
use crate::pdf;

mod assemble;
mod detect;
mod enrich;
mod locate;
mod normalize;
mod segment;

#[cfg(test)]
mod tests;

use assemble::*;
use locate::*;
use normalize::*;
use segment::*;

pub use detect::{
    DEFAULT_DETECTION_THRESHOLD, DetectionScores, DetectorOptions, StandardDetector,
    classify_scores,
};

/// Requirement extraction pipeline with every pattern compiled once.
#[derive(Debug)]
pub struct StandardParser {
    normalizer: PageNormalizer,
    locator: RequirementLocator,
    segments: SegmentProcessor,
    assembler: RequirementAssembler,
}

impl StandardParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            normalizer: PageNormalizer::new()?,
            locator: RequirementLocator::new()?,
            segments: SegmentProcessor::new()?,
            assembler: RequirementAssembler::new()?,
        })
    }

    pub fn normalize_pages(&self, pages: &[String]) -> String {
        self.normalizer.normalize(pages)
    }

    pub fn extract_requirements(&self, pages: &[String]) -> RequirementMap {
        let text = self.normalize_pages(pages);
        self.extract_requirements_from_text(&text)
    }

    /// Runs anchor location, segment processing and assembly on text that
    /// has already been normalized.
    pub fn extract_requirements_from_text(&self, text: &str) -> RequirementMap {
        let anchors = self.locator.locate(text);
        if anchors.is_empty() {
            warn!("no requirement anchors found in standard text");
            return RequirementMap::default();
        }

        let segments = anchors
            .iter()
            .enumerate()
            .map(|(index, anchor)| {
                let end = anchors
                    .get(index + 1)
                    .map_or(text.len(), |next| next.start_offset);
                let processed = self
                    .segments
                    .process(&text[anchor.start_offset..end], anchor.standard_type);

                AssemblySegment {
                    code: anchor.code.clone(),
                    full_designation: anchor.full_designation.clone(),
                    full_text: processed.full_text,
                    sub_points: processed.sub_points,
                }
            })
            .collect::<Vec<AssemblySegment>>();

        let requirements = self.assembler.assemble(segments);

        info!(
            anchors = anchors.len(),
            requirements = requirements.len(),
            sub_points = requirements
                .iter()
                .map(|requirement| requirement.sub_points.len())
                .sum::<usize>(),
            "extracted requirements"
        );

        requirements
    }
}

/// Detection result and requirement catalogue of one standard PDF.
#[derive(Debug)]
pub struct StandardDocument {
    pub detection: DetectionScores,
    pub requirements: RequirementMap,
}

pub fn extract_requirements_from_standard_pdf(pdf_path: &Path) -> Result<RequirementMap> {
    let pages = pdf::extract_pages(pdf_path)?;
    let parser = StandardParser::new()?;
    Ok(parser.extract_requirements(&pages))
}

/// Reads the PDF once and runs both detection and extraction on it.
pub fn read_standard_pdf(pdf_path: &Path, options: DetectorOptions) -> Result<StandardDocument> {
    let pages = pdf::extract_pages(pdf_path)?;
    let parser = StandardParser::new()?;
    let text = parser.normalize_pages(&pages);
    let detection = detect_standard(&text, options)?;
    let requirements = parser.extract_requirements_from_text(&text);

    info!(
        path = %pdf_path.display(),
        pages = pages.len(),
        standard = detection.standard.as_str(),
        requirements = requirements.len(),
        "read standard document"
    );

    Ok(StandardDocument {
        detection,
        requirements,
    })
}

pub fn detect_standard(text: &str, options: DetectorOptions) -> Result<DetectionScores> {
    let detector = StandardDetector::new()?;
    Ok(detector.detect(text, options))
}

/// Normalizes raw pages the same way extraction does, then detects.
pub fn detect_standard_in_pages(
    pages: &[String],
    options: DetectorOptions,
) -> Result<DetectionScores> {
    let text = PageNormalizer::new()?.normalize(pages);
    detect_standard(&text, options)
}

/// Classifies a standard PDF. Any failure to read the PDF is reported as
/// `UNKNOWN` rather than an error.
pub fn detect_standard_from_pdf(pdf_path: &Path, options: DetectorOptions) -> DetectionScores {
    let result = pdf::extract_pages(pdf_path)
        .and_then(|pages| detect_standard_in_pages(&pages, options));

    match result {
        Ok(scores) => {
            info!(
                path = %pdf_path.display(),
                esrs_score = scores.esrs_score,
                gri_score = scores.gri_score,
                standard = scores.standard.as_str(),
                "detected standard"
            );
            scores
        }
        Err(error) => {
            warn!(
                path = %pdf_path.display(),
                error = %format!("{error:#}"),
                "standard detection failed; reporting UNKNOWN"
            );
            DetectionScores::unknown()
        }
    }
}
