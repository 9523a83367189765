use anyhow::Result;

use crate::model::{CoverageRow, EncodedUnit};

use super::{MatchOptions, match_units};

pub const DEFAULT_COVERAGE_THRESHOLD: f64 = 0.5;

/// Best paragraph score per requirement unit for one report, `None` when the
/// report produced no match for that unit.
pub fn top_scores(
    requirements: &[EncodedUnit],
    paragraphs: &[EncodedUnit],
) -> Result<Vec<Option<f64>>> {
    let options = MatchOptions {
        top_k: 1,
        ..MatchOptions::default()
    };

    let reports = match_units(requirements, paragraphs, &options)?;
    Ok(reports
        .iter()
        .map(|report| report.matches.first().map(|hit| hit.score))
        .collect())
}

/// Aggregates per-report top scores into one row per unit.
///
/// `per_report` holds one score list per successfully processed report,
/// aligned with `units`. `reports_total` counts every report requested,
/// including skipped ones.
pub fn summarize_coverage(
    units: &[EncodedUnit],
    per_report: &[Vec<Option<f64>>],
    reports_total: usize,
    threshold: f64,
) -> Vec<CoverageRow> {
    units
        .iter()
        .enumerate()
        .map(|(index, encoded)| {
            let scores = per_report
                .iter()
                .filter_map(|scores| scores.get(index).copied().flatten())
                .collect::<Vec<f64>>();

            let avg_max_score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };

            CoverageRow {
                unit_id: encoded.unit.unit_id.clone(),
                code: encoded.unit.code.clone(),
                text: encoded.unit.text.clone(),
                avg_max_score,
                reports_covered: scores.iter().filter(|score| **score > threshold).count(),
                reports_total,
            }
        })
        .collect()
}
