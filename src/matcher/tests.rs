use crate::model::{EncodedUnit, Requirement, RequirementMap, TextUnit};

use super::*;

fn paragraph_vectors() -> Vec<Vec<f32>> {
    vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![1.0, 0.0, 1.0],
    ]
}

fn encoded(unit_id: &str, code: Option<&str>, text: &str, vector: Vec<f32>) -> EncodedUnit {
    EncodedUnit {
        unit: TextUnit {
            unit_id: unit_id.to_string(),
            code: code.map(str::to_string),
            text: text.to_string(),
        },
        vector,
    }
}

fn indices(matches: &MatchList) -> Vec<usize> {
    matches.iter().map(|hit| hit.paragraph_index).collect()
}

#[test]
fn returns_the_best_paragraphs_above_threshold_in_descending_order() {
    let requirement_vectors = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]];
    let options = MatchOptions {
        top_k: 2,
        min_score: 0.5,
    };

    let matches =
        match_requirements_to_report(&requirement_vectors, &paragraph_vectors(), &options)
            .expect("matching should succeed");

    assert_eq!(matches.len(), 2);
    assert_eq!(indices(&matches[0]), vec![0, 2]);
    assert_eq!(indices(&matches[1]), vec![1, 2]);
    assert!((matches[0][0].score - 1.0).abs() < 1e-9);
    assert!((matches[0][1].score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
}

#[test]
fn ties_keep_the_lower_paragraph_index_first() {
    let options = MatchOptions {
        top_k: 5,
        ..MatchOptions::default()
    };

    let matches =
        match_requirements_to_report(&[vec![1.0, 0.0, 0.0]], &paragraph_vectors(), &options)
            .expect("matching should succeed");

    assert_eq!(indices(&matches[0]), vec![0, 2, 4, 1, 3]);
}

#[test]
fn every_list_is_sorted_bounded_and_above_threshold() {
    let requirement_vectors = vec![
        vec![0.3, 0.9, 0.1],
        vec![0.5, 0.5, 0.5],
        vec![0.0, 0.0, 2.0],
    ];

    for top_k in 0..=6 {
        for min_score in [-1.0, 0.0, 0.4, 0.9] {
            let options = MatchOptions { top_k, min_score };
            let matches =
                match_requirements_to_report(&requirement_vectors, &paragraph_vectors(), &options)
                    .expect("matching should succeed");

            assert_eq!(matches.len(), requirement_vectors.len());
            for list in &matches {
                assert!(list.len() <= top_k);
                assert!(list.windows(2).all(|pair| pair[0].score >= pair[1].score));
                assert!(list.iter().all(|hit| hit.score >= min_score));
            }
        }
    }
}

#[test]
fn default_options_drop_negative_scores() {
    let matches = match_requirements_to_report(
        &[vec![1.0, 0.0]],
        &[vec![-1.0, 0.0], vec![-0.5, 0.1], vec![0.6, 0.8]],
        &MatchOptions::default(),
    )
    .expect("matching should succeed");

    assert_eq!(indices(&matches[0]), vec![2]);
    assert!((matches[0][0].score - 0.6).abs() < 1e-6);
}

#[test]
fn non_finite_scores_never_match() {
    let options = MatchOptions {
        min_score: -1.0,
        ..MatchOptions::default()
    };

    let matches = match_requirements_to_report(
        &[vec![1.0, 0.0]],
        &[vec![f32::NAN, 0.0], vec![0.0, 1.0]],
        &options,
    )
    .expect("matching should succeed");

    assert_eq!(indices(&matches[0]), vec![1]);
}

#[test]
fn matching_is_deterministic() {
    let requirement_vectors = vec![vec![0.2, 0.7, 0.1], vec![0.9, 0.1, 0.4]];
    let options = MatchOptions::default();

    let first = match_requirements_to_report(&requirement_vectors, &paragraph_vectors(), &options)
        .expect("matching should succeed");
    let second = match_requirements_to_report(&requirement_vectors, &paragraph_vectors(), &options)
        .expect("matching should succeed");

    assert_eq!(first, second);
}

#[test]
fn mismatched_dimensions_are_rejected() {
    let error = match_requirements_to_report(
        &[vec![1.0, 0.0]],
        &paragraph_vectors(),
        &MatchOptions::default(),
    )
    .expect_err("dimension mismatch should fail");

    assert!(error.to_string().contains("dimension mismatch"));
}

#[test]
fn empty_sides_produce_empty_results() {
    let options = MatchOptions::default();

    let no_paragraphs =
        match_requirements_to_report(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[], &options)
            .expect("matching should succeed");
    assert_eq!(no_paragraphs, vec![Vec::new(), Vec::new()]);

    let no_requirements = match_requirements_to_report(&[], &paragraph_vectors(), &options)
        .expect("matching should succeed");
    assert!(no_requirements.is_empty());
}

#[test]
fn flatten_requirements_emits_sub_points_or_full_text() {
    let mut requirements = RequirementMap::default();
    requirements.entry_or_insert(Requirement {
        code: "G1-2".to_string(),
        full_text: "1. The undertaking shall disclose its supplier policy.".to_string(),
        sub_points: vec![
            "1(a). The undertaking shall disclose its approach.".to_string(),
            "1(b). The undertaking shall disclose its policy.".to_string(),
        ],
        full_designation: "Disclosure Requirement G1-2 – Suppliers".to_string(),
    });
    requirements.entry_or_insert(Requirement {
        code: "Kriterium 10".to_string(),
        full_text: "Das Unternehmen legt offen, wie es Innovationen fördert.".to_string(),
        sub_points: Vec::new(),
        full_designation: "Kriterium 10 – Innovationsmanagement".to_string(),
    });
    requirements.entry_or_insert(Requirement {
        code: "GRI 2-1".to_string(),
        full_text: "  ".to_string(),
        sub_points: Vec::new(),
        full_designation: "GRI 2-1 Organizational details".to_string(),
    });

    let units = flatten_requirements(&requirements);
    let ids = units
        .iter()
        .map(|unit| unit.unit_id.as_str())
        .collect::<Vec<&str>>();

    assert_eq!(ids, vec!["G1-2#1", "G1-2#2", "Kriterium 10"]);
    assert_eq!(units[0].code.as_deref(), Some("G1-2"));
    assert_eq!(
        units[2].text,
        "Das Unternehmen legt offen, wie es Innovationen fördert."
    );
}

#[test]
fn match_units_attaches_paragraph_text() {
    let paragraphs = paragraph_units(&["Energy use fell.".to_string(), "Water use rose.".to_string()])
        .into_iter()
        .zip([vec![1.0, 0.0], vec![0.0, 1.0]])
        .map(|(unit, vector)| EncodedUnit { unit, vector })
        .collect::<Vec<EncodedUnit>>();
    let requirements = vec![encoded("E1-5#1", Some("E1-5"), "Energy", vec![0.9, 0.1])];

    let reports = match_units(
        &requirements,
        &paragraphs,
        &MatchOptions {
            top_k: 1,
            ..MatchOptions::default()
        },
    )
    .expect("matching should succeed");

    assert_eq!(paragraphs[1].unit.unit_id, "p1");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].unit_id, "E1-5#1");
    assert_eq!(reports[0].matches.len(), 1);
    assert_eq!(reports[0].matches[0].paragraph_index, 0);
    assert_eq!(reports[0].matches[0].paragraph, "Energy use fell.");
}

#[test]
fn coverage_averages_top_scores_and_counts_reports_above_threshold() {
    let units = vec![
        encoded("G1-1#1", Some("G1-1"), "first", vec![1.0, 0.0]),
        encoded("G1-1#2", Some("G1-1"), "second", vec![0.0, 1.0]),
    ];
    let per_report = vec![vec![Some(0.8), Some(0.4)], vec![Some(0.6), None]];

    let rows = summarize_coverage(&units, &per_report, 3, DEFAULT_COVERAGE_THRESHOLD);

    assert_eq!(rows.len(), 2);
    assert!((rows[0].avg_max_score - 0.7).abs() < 1e-9);
    assert_eq!(rows[0].reports_covered, 2);
    assert_eq!(rows[0].reports_total, 3);
    assert!((rows[1].avg_max_score - 0.4).abs() < 1e-9);
    assert_eq!(rows[1].reports_covered, 0);
}

#[test]
fn coverage_threshold_is_strict() {
    let units = vec![encoded("S1-1", Some("S1-1"), "policy", vec![1.0])];
    let rows = summarize_coverage(&units, &[vec![Some(0.5)]], 1, 0.5);

    assert_eq!(rows[0].reports_covered, 0);
}

#[test]
fn top_scores_takes_the_best_paragraph_per_unit() {
    let units = vec![
        encoded("a", None, "a", vec![1.0, 0.0]),
        encoded("b", None, "b", vec![0.0, 1.0]),
    ];
    let paragraphs = vec![encoded("p0", None, "p0", vec![1.0, 1.0])];

    let scores = top_scores(&units, &paragraphs).expect("scoring should succeed");
    assert_eq!(scores.len(), 2);
    assert!(scores.iter().all(|score| score
        .is_some_and(|value| (value - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6)));

    let empty = top_scores(&units, &[]).expect("scoring should succeed");
    assert_eq!(empty, vec![None, None]);
}

#[test]
fn top_scores_ignore_anti_parallel_paragraphs() {
    let units = vec![encoded("E1-1", Some("E1-1"), "plan", vec![1.0, 0.0])];
    let paragraphs = vec![encoded("p0", None, "p0", vec![-1.0, 0.0])];

    let scores = top_scores(&units, &paragraphs).expect("scoring should succeed");
    assert_eq!(scores, vec![None]);

    let rows = summarize_coverage(&units, &[scores], 1, DEFAULT_COVERAGE_THRESHOLD);
    assert_eq!(rows[0].avg_max_score, 0.0);
}
