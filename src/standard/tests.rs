use std::path::Path;

use crate::model::{DetectedStandard, StandardType};

use super::*;

fn parser() -> StandardParser {
    StandardParser::new().expect("standard parser should compile")
}

fn pages(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|text| text.to_string()).collect()
}

#[test]
fn esrs_sub_points_are_enriched_with_their_parent_sentence() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement G1-2 – Management of relationships with suppliers\n1. The undertaking shall disclose...\n(a) its approach...\n(b) its policy...",
    ]));

    let requirement = requirements.get("G1-2").expect("G1-2 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "1(a). The undertaking shall disclose... its approach...",
            "1(b). The undertaking shall disclose... its policy...",
        ]
    );
    assert!(
        !requirement
            .sub_points
            .iter()
            .any(|sub_point| sub_point.starts_with("1. "))
    );
    assert_eq!(
        requirement.full_designation,
        "Disclosure Requirement G1-2 – Management of relationships with suppliers"
    );
    assert!(requirement.full_text.starts_with("1. The undertaking shall disclose"));
}

#[test]
fn gri_sub_points_stop_before_compilation_requirements() {
    let requirements = parser().extract_requirements(&pages(&[
        "GRI 205-1 Operations assessed for corruption risks\na. Total number and percentage...\nb. Significant risks...\nCompilation requirements\n...",
    ]));

    let requirement = requirements
        .get("GRI 205-1")
        .expect("GRI 205-1 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec!["a. Total number and percentage...", "b. Significant risks..."]
    );
    assert!(!requirement.full_text.contains("Compilation"));
}

#[test]
fn table_of_contents_lines_do_not_become_anchors() {
    let parser = parser();

    let toc_only = parser.extract_requirements(&pages(&[
        "Disclosure Requirement G1-2 – Supplier relationships ..................... 14",
    ]));
    assert!(toc_only.is_empty());

    let requirements = parser.extract_requirements(&pages(&[
        "Contents\nDisclosure Requirement G1-2 – Supplier relationships ..................... 14",
        "Disclosure Requirement G1-2 – Supplier relationships\n5. The undertaking shall describe its supplier policy.",
    ]));
    assert_eq!(requirements.len(), 1);
    let requirement = requirements.get("G1-2").expect("body anchor should survive");
    assert_eq!(
        requirement.sub_points,
        vec!["5. The undertaking shall describe its supplier policy."]
    );
    assert_eq!(
        requirement.full_designation,
        "Disclosure Requirement G1-2 – Supplier relationships"
    );
}

#[test]
fn empty_standard_yields_no_requirements_and_unknown_detection() {
    let parser = parser();
    assert!(parser.extract_requirements(&[]).is_empty());
    assert!(parser.extract_requirements(&pages(&["", "  \n "])).is_empty());

    let scores = detect_standard("", DetectorOptions::default()).expect("detector should compile");
    assert_eq!(scores.standard, DetectedStandard::Unknown);
}

#[test]
fn unreadable_pdf_is_detected_as_unknown() {
    let scores = detect_standard_from_pdf(
        Path::new("/nonexistent/standard.pdf"),
        DetectorOptions::default(),
    );
    assert_eq!(scores, DetectionScores::unknown());
}

#[test]
fn roman_items_nest_under_letters_and_parents_are_not_emitted() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement E1-1 – Transition plan for climate change mitigation\n14. The undertaking shall disclose its transition plan.\n16. The information shall include:\n(a) targets. These are set.\n(i) by 2030;\n(ii) by 2050;\n(b) actions.",
    ]));

    let requirement = requirements.get("E1-1").expect("E1-1 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "14. The undertaking shall disclose its transition plan.",
            "16(a)(i). The information shall include: targets. by 2030;",
            "16(a)(ii). The information shall include: targets. by 2050;",
            "16(b). The information shall include: actions.",
        ]
    );
}

#[test]
fn lone_i_after_h_is_read_as_a_letter() {
    let processor = SegmentProcessor::new().expect("segment processor should compile");
    let processed = processor.process(
        "Disclosure Requirement S1-1 – Policies\n1. Lead.\n(a) alpha\n(b) bravo\n(c) charlie\n(d) delta\n(e) echo\n(f) foxtrot\n(g) golf\n(h) hotel\n(i) india",
        StandardType::Esrs,
    );

    assert_eq!(processed.sub_points.len(), 9);
    assert_eq!(
        processed.sub_points.last().map(String::as_str),
        Some("1(i). Lead. india")
    );
}

#[test]
fn footnotes_are_skipped_until_the_next_item() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement S1-1 – Policies\n10. The undertaking shall describe its policies.\n12 See Directive 2013/34/EU.\nThis footnote continues.\n11. The undertaking shall state its commitments.",
    ]));

    let requirement = requirements.get("S1-1").expect("S1-1 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "10. The undertaking shall describe its policies.",
            "11. The undertaking shall state its commitments.",
        ]
    );
}

#[test]
fn amendment_annotations_are_removed_from_esrs_text() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement E1-6 – Gross Scopes 1, 2, 3 emissions\n44. The undertaking shall disclose its emissions (45 amended) in tonnes.",
    ]));

    let requirement = requirements.get("E1-6").expect("E1-6 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec!["44. The undertaking shall disclose its emissions in tonnes."]
    );
    assert!(!requirement.full_text.contains("amended"));
}

#[test]
fn gri_sub_points_carry_a_single_full_stop() {
    let requirements = parser().extract_requirements(&pages(&[
        "GRI 305-1 Direct (Scope 1) GHG emissions\na. Gross direct GHG emissions in metric tons. Further detail follows.\nb. Gases included in the calculation.\ni. CO2 emissions. Extra.\nii. Methane emissions.",
    ]));

    let requirement = requirements
        .get("GRI 305-1")
        .expect("GRI 305-1 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "a. Gross direct GHG emissions in metric tons.",
            "b-i. Gases included in the calculation CO2 emissions.",
            "b-ii. Gases included in the calculation Methane emissions.",
        ]
    );

    for sub_point in &requirement.sub_points {
        let (_, body) = sub_point
            .split_once(". ")
            .expect("sub-point should carry a label");
        assert_eq!(body.matches('.').count(), 1, "{sub_point}");
    }
}

#[test]
fn footer_lines_and_hyphenation_are_normalized_away() {
    let parser = parser();
    let input = pages(&[
        "Disclosure Requirement G1-1 – Business conduct policies\n7. The undertaking shall describe its cor-\nporate culture.\nPage 3 of 40",
        "12\n[Draft]\nJanuary 2023\n8. The undertaking shall disclose its whistle-blowing mechanisms.",
    ]);

    assert_eq!(
        parser.normalize_pages(&input),
        "Disclosure Requirement G1-1 – Business conduct policies\n7. The undertaking shall describe its corporate culture.\n8. The undertaking shall disclose its whistle-blowing mechanisms."
    );

    let requirements = parser.extract_requirements(&input);
    let requirement = requirements.get("G1-1").expect("G1-1 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "7. The undertaking shall describe its corporate culture.",
            "8. The undertaking shall disclose its whistle-blowing mechanisms.",
        ]
    );
}

#[test]
fn repeated_codes_merge_into_the_first_record() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement G1-1 – Policies\n1. First duty.\nDisclosure Requirement G1-1 – Policies (continued)\n2. Second duty.",
    ]));

    assert_eq!(requirements.codes(), vec!["G1-1"]);
    let requirement = requirements.get("G1-1").expect("G1-1 should be extracted");
    assert_eq!(requirement.full_designation, "Disclosure Requirement G1-1 – Policies");
    assert_eq!(requirement.sub_points, vec!["1. First duty.", "2. Second duty."]);
}

#[test]
fn only_the_final_requirement_loses_back_matter() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement G1-1 – Policies\n1. First duty.\nDisclosure Requirement G1-2 – Suppliers\n2. Second duty.\nAppendix A: Defined terms\nSomething.",
    ]));

    assert_eq!(requirements.codes(), vec!["G1-1", "G1-2"]);
    assert_eq!(
        requirements.get("G1-1").map(|record| record.full_text.as_str()),
        Some("1. First duty.")
    );
    assert_eq!(
        requirements.get("G1-2").map(|record| record.full_text.as_str()),
        Some("2. Second duty.")
    );
}

#[test]
fn german_criterion_headings_are_anchored() {
    let requirements = parser().extract_requirements(&pages(&[
        "Kriterium 10 – Innovations- und Produktmanagement\nDas Unternehmen legt offen, wie es Innovationen fördert.",
    ]));

    let requirement = requirements
        .get("Kriterium 10")
        .expect("Kriterium 10 should be extracted");
    assert!(requirement.sub_points.is_empty());
    assert!(requirement.full_text.ends_with("wie es Innovationen fördert."));
}

#[test]
fn extraction_is_deterministic() {
    let input = pages(&[
        "Disclosure Requirement G1-2 – Suppliers\n1. The undertaking shall disclose:\n(a) its approach\n(b) its policy",
        "GRI 205-1 Operations assessed for corruption risks\na. Total number of operations.",
    ]);
    let parser = parser();

    assert_eq!(
        parser.extract_requirements(&input),
        parser.extract_requirements(&input)
    );
}

#[test]
fn detector_separates_esrs_gri_and_unknown_text() {
    let options = DetectorOptions::default();

    let esrs = detect_standard(
        "ESRS G1 Business conduct. EFRAG draft under the CSRD. Disclosure Requirement on supplier relationships.",
        options,
    )
    .expect("detector should compile");
    assert_eq!(esrs.standard, DetectedStandard::Esrs);
    assert!(esrs.esrs_score > esrs.gri_score);

    let gri = detect_standard(
        "GRI 205: Anti-corruption. Universal Standards by the Global Reporting Initiative. Disclosure 205-1 Operations assessed. Topic Standards and Sector Standards.",
        options,
    )
    .expect("detector should compile");
    assert_eq!(gri.standard, DetectedStandard::Gri);
    assert_eq!(gri.esrs_score, 0.0);

    let unknown = detect_standard("Annual report of the company.", options)
        .expect("detector should compile");
    assert_eq!(unknown.standard, DetectedStandard::Unknown);
}

#[test]
fn classification_requires_the_threshold_and_prefers_esrs_on_ties() {
    assert_eq!(classify_scores(0.5, 0.2, 0.55), DetectedStandard::Unknown);
    assert_eq!(classify_scores(0.6, 0.6, 0.55), DetectedStandard::Esrs);
    assert_eq!(classify_scores(0.5, 0.75, 0.55), DetectedStandard::Gri);
}

#[test]
fn application_requirements_are_cut_from_esrs_segments() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement E1-1 – Transition plan for climate change mitigation\n14. The undertaking shall disclose its transition plan.\nAPPLICATION REQUIREMENTS\nAR 1. When disclosing its plan the undertaking shall explain the targets.",
    ]));

    let requirement = requirements.get("E1-1").expect("E1-1 should be extracted");
    assert_eq!(
        requirement.full_text,
        "14. The undertaking shall disclose its transition plan."
    );
    assert_eq!(
        requirement.sub_points,
        vec!["14. The undertaking shall disclose its transition plan."]
    );
}

#[test]
fn german_gri_guidance_sections_are_cut() {
    let requirements = parser().extract_requirements(&pages(&[
        "Angabe 205-1 Auf Korruptionsrisiken geprüfte Betriebsstätten\na. Gesamtzahl und Prozentsatz der Betriebsstätten.\nb. Erhebliche Risiken.\nErläuterungen\nc. Hinweis zur Zählung.",
        "Angabe 205-2 Kommunikation und Schulungen\na. Gesamtzahl der Mitglieder.\nHintergrundinformationen\nb. Hinweis zur Herkunft.",
    ]));

    assert_eq!(requirements.codes(), vec!["GRI 205-1", "GRI 205-2"]);
    assert_eq!(
        requirements
            .get("GRI 205-1")
            .map(|record| record.sub_points.clone()),
        Some(vec![
            "a. Gesamtzahl und Prozentsatz der Betriebsstätten.".to_string(),
            "b. Erhebliche Risiken.".to_string(),
        ])
    );
    assert_eq!(
        requirements
            .get("GRI 205-2")
            .map(|record| record.sub_points.clone()),
        Some(vec!["a. Gesamtzahl der Mitglieder.".to_string()])
    );
}

#[test]
fn section_headings_are_removed_from_text_and_sub_points() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure Requirement E1-5 – Energy consumption and mix\n35. The undertaking shall provide information on its energy consumption.\nImpact, risk and opportunity management\n36. The undertaking shall disclose its energy intensity.\nMetrics and targets",
    ]));

    let requirement = requirements.get("E1-5").expect("E1-5 should be extracted");
    assert_eq!(
        requirement.sub_points,
        vec![
            "35. The undertaking shall provide information on its energy consumption.",
            "36. The undertaking shall disclose its energy intensity.",
        ]
    );
    assert_eq!(
        requirement.full_text,
        "35. The undertaking shall provide information on its energy consumption. 36. The undertaking shall disclose its energy intensity."
    );
}

#[test]
fn repeated_titles_are_dropped_when_no_item_starts_the_text() {
    let requirements = parser().extract_requirements(&pages(&[
        "Kriterium 10 – Innovations- und Produktmanagement\nDas Unternehmen legt offen, wie es Innovationen fördert.",
        "Kriterium 10 – Innovations- und Produktmanagement\nEs beschreibt die Wirkung.",
    ]));

    assert_eq!(requirements.codes(), vec!["Kriterium 10"]);
    assert_eq!(
        requirements
            .get("Kriterium 10")
            .map(|record| record.full_text.as_str()),
        Some(
            "Kriterium 10 – Innovations- und Produktmanagement Das Unternehmen legt offen, wie es Innovationen fördert. Es beschreibt die Wirkung."
        )
    );
}

#[test]
fn spaced_german_abbreviations_are_not_list_items() {
    let requirements = parser().extract_requirements(&pages(&[
        "Kriterium 10 – Innovations- und Produktmanagement\nDas Unternehmen legt offen, wie es z. B. Innovationen fördert, d. h. welche Verfahren es nutzt.",
    ]));

    assert_eq!(
        requirements
            .get("Kriterium 10")
            .map(|record| record.full_text.as_str()),
        Some(
            "Kriterium 10 – Innovations- und Produktmanagement Das Unternehmen legt offen, wie es z. B. Innovationen fördert, d. h. welche Verfahren es nutzt."
        )
    );
}

#[test]
fn alternative_anchor_forms_resolve_to_normalized_codes() {
    let requirements = parser().extract_requirements(&pages(&[
        "Disclosure 2-1 Organizational details\na. Report its legal name.",
        "Criterion 3 – Objectives\nThe company discloses its sustainability targets.",
        "2. Wesentlichkeit\nDas Unternehmen legt offen, welche Aspekte wesentlich sind.",
        "Requirement 3: Report on the approach\na. Describe the process.\nb. Report the outcome.",
    ]));

    assert_eq!(
        requirements.codes(),
        vec!["GRI 2-1", "Criterion 3", "2. Wesentlichkeit", "Requirement 3"]
    );
    assert_eq!(
        requirements
            .get("GRI 2-1")
            .map(|record| record.sub_points.clone()),
        Some(vec!["a. Report its legal name.".to_string()])
    );
    assert!(
        requirements
            .get("Criterion 3")
            .is_some_and(|record| record.full_text.ends_with("its sustainability targets."))
    );
    assert_eq!(
        requirements
            .get("2. Wesentlichkeit")
            .map(|record| record.full_designation.as_str()),
        Some("2. Wesentlichkeit")
    );
    assert_eq!(
        requirements
            .get("Requirement 3")
            .map(|record| record.sub_points.clone()),
        Some(vec![
            "a. Describe the process.".to_string(),
            "b. Report the outcome.".to_string(),
        ])
    );
}

#[test]
fn gri_table_of_contents_lines_are_rejected() {
    let requirements = parser().extract_requirements(&pages(&[
        "Contents\nDisclosure 2-1 Organizational details ..... 5",
        "Disclosure 2-1 Organizational details\na. Report its legal name.",
    ]));

    assert_eq!(requirements.codes(), vec!["GRI 2-1"]);
    assert_eq!(
        requirements
            .get("GRI 2-1")
            .map(|record| record.full_designation.as_str()),
        Some("Disclosure 2-1 Organizational details")
    );
}

#[test]
fn detection_sees_normalized_page_text() {
    let input = pages(&["ESRS overview under the CSRD\nDisclosure Require-\nment E1-1\nPage 2 of 10"]);
    let options = DetectorOptions::default();

    let raw = detect_standard(&input.join("\n"), options).expect("detector should compile");
    assert_eq!(raw.standard, DetectedStandard::Unknown);

    let normalized = detect_standard_in_pages(&input, options).expect("detector should compile");
    assert_eq!(normalized.standard, DetectedStandard::Esrs);
    assert!((normalized.esrs_score - 4.0 / 6.0).abs() < 1e-9);
}
