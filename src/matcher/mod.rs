use anyhow::{Result, bail};

use crate::model::{Match, MatchList};
use crate::semantic::cosine_similarity;

mod coverage;
mod units;

#[cfg(test)]
mod tests;

pub use coverage::{DEFAULT_COVERAGE_THRESHOLD, summarize_coverage, top_scores};
pub use units::{flatten_requirements, match_units, paragraph_units};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MIN_SCORE: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub top_k: usize,
    pub min_score: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Ranks every paragraph against every requirement by cosine similarity.
///
/// The result is aligned with `requirement_vectors`. Each list is sorted by
/// descending score with ties on the lower paragraph index first, filtered by
/// `min_score` and then cut to `top_k`. Non-finite scores never match.
pub fn match_requirements_to_report(
    requirement_vectors: &[Vec<f32>],
    paragraph_vectors: &[Vec<f32>],
    options: &MatchOptions,
) -> Result<Vec<MatchList>> {
    ensure_uniform_dimensions(requirement_vectors, paragraph_vectors)?;

    let matches = requirement_vectors
        .iter()
        .map(|requirement| rank_paragraphs(requirement, paragraph_vectors, options))
        .collect();

    Ok(matches)
}

fn rank_paragraphs(
    requirement: &[f32],
    paragraph_vectors: &[Vec<f32>],
    options: &MatchOptions,
) -> MatchList {
    let mut ranked = paragraph_vectors
        .iter()
        .enumerate()
        .map(|(paragraph_index, paragraph)| Match {
            paragraph_index,
            score: cosine_similarity(requirement, paragraph),
        })
        .filter(|candidate| candidate.score.is_finite() && candidate.score >= options.min_score)
        .collect::<Vec<Match>>();

    ranked.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.paragraph_index.cmp(&right.paragraph_index))
    });

    ranked.truncate(options.top_k);
    ranked
}

fn ensure_uniform_dimensions(
    requirement_vectors: &[Vec<f32>],
    paragraph_vectors: &[Vec<f32>],
) -> Result<()> {
    let Some(expected) = requirement_vectors
        .iter()
        .chain(paragraph_vectors)
        .map(Vec::len)
        .next()
    else {
        return Ok(());
    };

    for (side, vectors) in [
        ("requirement", requirement_vectors),
        ("paragraph", paragraph_vectors),
    ] {
        if let Some((index, vector)) = vectors
            .iter()
            .enumerate()
            .find(|(_, vector)| vector.len() != expected)
        {
            bail!(
                "vector dimension mismatch: expected {expected}, {side} vector {index} has {}",
                vector.len()
            );
        }
    }

    Ok(())
}
