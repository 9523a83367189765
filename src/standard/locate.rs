use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::debug;

use crate::model::StandardType;
use crate::text::{char_window, normalize_whitespace};

const TOC_WINDOW_CHARS: usize = 250;

/// German sustainability code (DNK) section headings.
const DNK_TOPICS: &[&str] = &[
    "Strategische Analyse und Maßnahmen",
    "Strategie",
    "Wesentlichkeit",
    "Ziele",
    "Tiefe der Wertschöpfungskette",
    "Verantwortung",
    "Regeln und Prozesse",
    "Kontrolle",
    "Anreizsysteme",
    "Beteiligung von Anspruchsgruppen",
    "Innovations- und Produktmanagement",
    "Inanspruchnahme natürlicher Ressourcen",
    "Ressourcenmanagement",
    "Klimarelevante Emissionen",
    "Arbeitnehmerrechte",
    "Chancengerechtigkeit",
    "Qualifizierung",
    "Menschenrechte",
    "Gemeinwesen",
    "Politische Einflussnahme",
    "Gesetzes- und richtlinienkonformes Verhalten",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorKind {
    EsrsCode,
    Criterion,
    DnkSection,
    GriCode,
    GriRequirement,
}

impl AnchorKind {
    fn family(self) -> StandardType {
        match self {
            Self::EsrsCode | Self::Criterion | Self::DnkSection => StandardType::Esrs,
            Self::GriCode | Self::GriRequirement => StandardType::Gri,
        }
    }
}

/// Alternatives in priority order; the first one that matches at a position wins.
const ANCHOR_GROUPS: &[(&str, AnchorKind)] = &[
    ("esrs_dr", AnchorKind::EsrsCode),
    ("esrs_disclosure", AnchorKind::EsrsCode),
    ("esrs_bare", AnchorKind::EsrsCode),
    ("criterion_de", AnchorKind::Criterion),
    ("criterion_en", AnchorKind::Criterion),
    ("dnk_section", AnchorKind::DnkSection),
    ("gri_code", AnchorKind::GriCode),
    ("gri_disclosure", AnchorKind::GriCode),
    ("gri_angabe", AnchorKind::GriCode),
    ("gri_requirement", AnchorKind::GriRequirement),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequirementAnchor {
    pub(crate) code: String,
    pub(crate) start_offset: usize,
    pub(crate) standard_type: StandardType,
    pub(crate) full_designation: String,
}

#[derive(Debug)]
pub(crate) struct RequirementLocator {
    anchor: Regex,
    esrs_vocabulary: Regex,
    gri_vocabulary: Regex,
    esrs_code: Regex,
    gri_code: Regex,
    criterion_code: Regex,
    dnk_code: Regex,
    requirement_code: Regex,
    toc_line: Regex,
    dot_leader_tail: Regex,
}

impl RequirementLocator {
    pub(crate) fn new() -> Result<Self> {
        let dash = "[-–—−]";
        let topics = DNK_TOPICS.join("|");
        let anchor_source = [
            format!(
                r"^(?P<esrs_dr>Disclosure[ \t]+Requirement[ \t]+[GES]\d{{1,2}}{dash}\d{{1,2}}[ \t]*[-–—−:][^\n]*)"
            ),
            format!(
                r"^(?P<esrs_disclosure>Disclosure[ \t]+[GES]\d{{1,2}}{dash}\d{{1,2}}[ \t]*[-–—−:][^\n]*)"
            ),
            format!(r"^(?P<esrs_bare>[GES]\d{{1,2}}{dash}\d{{1,2}}[ \t]*{dash}[^\n]*)"),
            r"^(?P<criterion_de>Kriterium[ \t]+\d{1,2}\b[^\n]*)".to_string(),
            r"^(?P<criterion_en>Criterion[ \t]+\d{1,2}\b[^\n]*)".to_string(),
            format!(r"^(?P<dnk_section>\d{{1,2}}\.[ \t]+(?:{topics})\b[^\n]*)"),
            format!(r"^(?P<gri_code>GRI(?:[ \t]+SRS)?[- \t]?\d{{1,3}}{dash}\d{{1,2}}\b[^\n]*)"),
            format!(r"^(?P<gri_disclosure>Disclosure[ \t]+\d{{1,3}}{dash}\d{{1,2}}\b[^\n]*)"),
            format!(r"^(?P<gri_angabe>Angabe[ \t]+\d{{1,3}}{dash}\d{{1,2}}\b[^\n]*)"),
            r"^(?P<gri_requirement>(?:Requirement|Anforderung)[ \t]+\d{1,2}[ \t]*:[^\n]*)"
                .to_string(),
        ]
        .join("|");

        Ok(Self {
            anchor: Regex::new(&format!("(?m){anchor_source}"))
                .context("failed to compile requirement anchor regex")?,
            esrs_vocabulary: Regex::new(&format!(
                r"Disclosure[ \t]+Requirement|\bESRS\b|\b[GES]\d{{1,2}}{dash}\d|\bKriterium\b|\bCriterion\b"
            ))
            .context("failed to compile ESRS vocabulary regex")?,
            gri_vocabulary: Regex::new(&format!(
                r"\bGRI\b|\bAngabe[ \t]+\d|^Disclosure[ \t]+\d{{1,3}}{dash}|^(?:Requirement|Anforderung)[ \t]+\d{{1,2}}[ \t]*:"
            ))
            .context("failed to compile GRI vocabulary regex")?,
            esrs_code: Regex::new(&format!(r"\b([GES]\d{{1,2}}){dash}(\d{{1,2}})\b"))
                .context("failed to compile ESRS code regex")?,
            gri_code: Regex::new(&format!(r"(\d{{1,3}}){dash}(\d{{1,2}})\b"))
                .context("failed to compile GRI code regex")?,
            criterion_code: Regex::new(r"^(Kriterium|Criterion)[ \t]+(\d{1,2})\b")
                .context("failed to compile criterion code regex")?,
            dnk_code: Regex::new(&format!(r"^(\d{{1,2}})\.[ \t]+({topics})\b"))
                .context("failed to compile DNK code regex")?,
            requirement_code: Regex::new(r"^(Requirement|Anforderung)[ \t]+(\d{1,2})\b")
                .context("failed to compile requirement code regex")?,
            toc_line: Regex::new(r"\.{2,}\s*\d+\s*$").context("failed to compile TOC line regex")?,
            dot_leader_tail: Regex::new(r"[ \t]*\.{2,}[ \t]*\d*[ \t]*$")
                .context("failed to compile dot leader regex")?,
        })
    }

    /// Finds requirement headings in normalized text, sorted by offset.
    pub(crate) fn locate(&self, text: &str) -> Vec<RequirementAnchor> {
        let mut anchors = Vec::new();

        for captures in self.anchor.captures_iter(text) {
            let Some((line, kind)) = matched_alternative(&captures) else {
                continue;
            };

            if self.looks_like_table_of_contents(text, line.start()) {
                debug!(
                    offset = line.start(),
                    heading = line.as_str(),
                    "skipping table of contents anchor"
                );
                continue;
            }

            let standard_type = self.classify(line.as_str(), kind);
            let Some(code) = self.normalize_code(line.as_str(), kind) else {
                debug!(heading = line.as_str(), "skipping anchor without a resolvable code");
                continue;
            };

            let full_designation = self.clean_designation(line.as_str());
            if full_designation.is_empty() {
                debug!(code = %code, "skipping anchor with an empty designation");
                continue;
            }

            debug!(
                code = %code,
                standard = standard_type.as_str(),
                offset = line.start(),
                "located requirement anchor"
            );
            anchors.push(RequirementAnchor {
                code,
                start_offset: line.start(),
                standard_type,
                full_designation,
            });
        }

        anchors.sort_by_key(|anchor| anchor.start_offset);
        anchors
    }

    fn looks_like_table_of_contents(&self, text: &str, line_start: usize) -> bool {
        char_window(text, line_start, TOC_WINDOW_CHARS)
            .lines()
            .any(|line| self.toc_line.is_match(line))
    }

    fn classify(&self, heading: &str, kind: AnchorKind) -> StandardType {
        let esrs = self.esrs_vocabulary.is_match(heading);
        let gri = self.gri_vocabulary.is_match(heading);

        match (esrs, gri) {
            (true, false) => StandardType::Esrs,
            (false, true) => StandardType::Gri,
            _ => kind.family(),
        }
    }

    fn normalize_code(&self, heading: &str, kind: AnchorKind) -> Option<String> {
        match kind {
            AnchorKind::EsrsCode => self
                .esrs_code
                .captures(heading)
                .map(|captures| format!("{}-{}", &captures[1], &captures[2])),
            AnchorKind::Criterion => self
                .criterion_code
                .captures(heading)
                .map(|captures| format!("{} {}", &captures[1], &captures[2])),
            AnchorKind::DnkSection => self
                .dnk_code
                .captures(heading)
                .map(|captures| format!("{}. {}", &captures[1], &captures[2])),
            AnchorKind::GriCode => self
                .gri_code
                .captures(heading)
                .map(|captures| format!("GRI {}-{}", &captures[1], &captures[2])),
            AnchorKind::GriRequirement => self
                .requirement_code
                .captures(heading)
                .map(|captures| format!("{} {}", &captures[1], &captures[2])),
        }
    }

    fn clean_designation(&self, heading: &str) -> String {
        let stripped = self.dot_leader_tail.replace(heading, "");
        normalize_whitespace(&stripped)
            .trim_end_matches([' ', ':', '-', '–', '—', '−'])
            .to_string()
    }
}

fn matched_alternative<'h>(captures: &Captures<'h>) -> Option<(regex::Match<'h>, AnchorKind)> {
    ANCHOR_GROUPS
        .iter()
        .find_map(|(name, kind)| captures.name(name).map(|line| (line, *kind)))
}
