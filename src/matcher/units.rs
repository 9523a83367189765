use anyhow::Result;
use tracing::info;

use crate::model::{EncodedUnit, MatchedParagraph, RequirementMap, TextUnit, UnitMatchReport};

use super::{MatchOptions, match_requirements_to_report};

/// One unit per sub-point, or the full text for requirements without
/// sub-points. Empty texts produce no unit.
pub fn flatten_requirements(requirements: &RequirementMap) -> Vec<TextUnit> {
    let mut units = Vec::new();

    for requirement in requirements.iter() {
        if requirement.sub_points.is_empty() {
            if !requirement.full_text.trim().is_empty() {
                units.push(TextUnit {
                    unit_id: requirement.code.clone(),
                    code: Some(requirement.code.clone()),
                    text: requirement.full_text.clone(),
                });
            }
            continue;
        }

        for (position, sub_point) in requirement.sub_points.iter().enumerate() {
            if sub_point.trim().is_empty() {
                continue;
            }
            units.push(TextUnit {
                unit_id: format!("{}#{}", requirement.code, position + 1),
                code: Some(requirement.code.clone()),
                text: sub_point.clone(),
            });
        }
    }

    units
}

pub fn paragraph_units(paragraphs: &[String]) -> Vec<TextUnit> {
    paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| TextUnit {
            unit_id: format!("p{index}"),
            code: None,
            text: paragraph.clone(),
        })
        .collect()
}

/// Matches encoded requirement units against encoded paragraphs and
/// attaches the paragraph text to every hit.
pub fn match_units(
    requirements: &[EncodedUnit],
    paragraphs: &[EncodedUnit],
    options: &MatchOptions,
) -> Result<Vec<UnitMatchReport>> {
    let requirement_vectors = requirements
        .iter()
        .map(|encoded| encoded.vector.clone())
        .collect::<Vec<Vec<f32>>>();
    let paragraph_vectors = paragraphs
        .iter()
        .map(|encoded| encoded.vector.clone())
        .collect::<Vec<Vec<f32>>>();

    let match_lists =
        match_requirements_to_report(&requirement_vectors, &paragraph_vectors, options)?;

    let reports = requirements
        .iter()
        .zip(match_lists)
        .map(|(encoded, matches)| UnitMatchReport {
            unit_id: encoded.unit.unit_id.clone(),
            code: encoded.unit.code.clone(),
            text: encoded.unit.text.clone(),
            matches: matches
                .into_iter()
                .filter_map(|hit| {
                    paragraphs.get(hit.paragraph_index).map(|paragraph| MatchedParagraph {
                        paragraph_index: hit.paragraph_index,
                        score: hit.score,
                        paragraph: paragraph.unit.text.clone(),
                    })
                })
                .collect(),
        })
        .collect::<Vec<UnitMatchReport>>();

    info!(
        units = reports.len(),
        paragraphs = paragraphs.len(),
        matches = reports.iter().map(|report| report.matches.len()).sum::<usize>(),
        top_k = options.top_k,
        "matched requirement units to paragraphs"
    );

    Ok(reports)
}
