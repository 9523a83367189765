use anyhow::{Context, Result};
use regex::Regex;

/// Paragraphs matching any of these are metadata, navigation or citations
/// rather than report substance.
const NOISE_PATTERNS: &[&str] = &[
    // navigation headings
    r"^(?:Table of Contents|List of Figures|List of Tables|Appendix|Inhaltsverzeichnis|Abbildungsverzeichnis|Tabellenverzeichnis|Anhang)$",
    r"^Page\s*\d+|^Seite\s*\d+",
    // salutations
    r"^Dear (?:Shareholders|Readers|Stakeholders|Customers)",
    r"^(?:Sehr geehrte|Liebe) (?:Damen und Herren|Aktionär.*|Leser.*)",
    // links
    r"\bhttps?://\S+",
    r"\S+@\S+\.\S+",
    // framework citations
    r"\bGRI\s*\d{1,3}(?:-\d{1,3})?",
    r"\bGlobal Reporting Initiative\b",
    r"\bGRI[- ]?(?:Standards|SRS|Index|Bericht)?\b",
    r"\bDNK\b|\bDeutscher Nachhaltigkeitskodex\b",
    r"\bCSRD\b|\bCorporate Sustainability Reporting Directive\b",
    r"\bESRS\s*[A-Z]?\d{0,3}(?:-\d+)?",
    r"\bEFRAG\b",
    r"\bUN\b.*?(?:Compact|Principles|SDG|Agenda)",
    r"\bUnited Nations\b",
    r"\bOECD\b",
    r"\bIFRS\s*\d{0,3}",
    r"\bISO\s*\d{4,6}",
    r"\bEU[- ]?(?:Directive|Regulation|Verordnung|Richtlinie)?\s*\d{4}/\d{1,5}",
    r"\b(?:Artikel|Art\.?)\s*\d+(?:\s*[a-z]*)?\s*(?:Abs\.?|Paragraph)?\s*\d*",
    r"\bCSR[- ]?(?:Richtlinie|Directive|RUG|Umsetzungsgesetz)\b",
    r"\bAngabe\s*\d{3}-\d{1,3}",
    r"\bDisclosure\s+(?:Requirement|DR)\s+[A-Z]?\d{1,2}(?:-\d{1,2})?",
    r"\bKriterium\s*\d+",
    r"\bIndikator\s*\d+",
    r"\bKey (?:figures|metrics|indicators)\b",
    r"\bThemenstandard\b|\bTopic standard\b",
    // back matter and footnotes
    r"^(?:Glossary|Annex|Attachment|Appendix|Bibliography|Footnote|Quellen|Anhang|Glossar|Literaturverzeichnis)\b",
    r"\[\d+\]",
    // legal boilerplate
    r"\b(?:All rights reserved|Haftungsausschluss|Rechtsgrundlage|Impressum|Datenschutz|Copyright|Markenzeichen|Disclaimer)\b",
    r"\bReporting period\b|\bBerichtszeitraum\b",
    r"\bBerichtspflicht(?:ig)?\b",
    r"\bComply or Explain\b",
    r"\b(?:Stand|Version):?\s*\d{4}",
];

#[derive(Debug)]
pub(crate) struct NoiseFilter {
    patterns: Vec<Regex>,
}

impl NoiseFilter {
    pub(crate) fn new() -> Result<Self> {
        let patterns = NOISE_PATTERNS
            .iter()
            .map(|source| {
                Regex::new(&format!("(?i){source}"))
                    .with_context(|| format!("failed to compile noise regex: {source}"))
            })
            .collect::<Result<Vec<Regex>>>()?;

        Ok(Self { patterns })
    }

    pub(crate) fn is_noise(&self, paragraph: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.is_match(paragraph))
    }
}
