use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::commands::{MANIFEST_VERSION, describe_source, preview};
use crate::matcher::{flatten_requirements, match_units, paragraph_units};
use crate::model::AnalysisManifest;
use crate::report::extract_paragraphs_from_pdf;
use crate::semantic::{create_encoder, encode_units, resolve_model_config};
use crate::standard::{DetectorOptions, read_standard_pdf};
use crate::util::{now_utc_string, write_json_pretty, write_json_stdout};

const PREVIEW_CHARS: usize = 160;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let started = Instant::now();
    let match_options = args.match_options();
    let paragraph_options = args.paragraphs.options();

    let standard_source = describe_source(&args.standard_pdf)?;
    let report_source = describe_source(&args.report_pdf)?;

    let document = read_standard_pdf(&args.standard_pdf, DetectorOptions::default())?;
    if document.requirements.is_empty() {
        warn!(path = %args.standard_pdf.display(), "no requirements extracted; nothing to match");
    }

    let paragraphs = extract_paragraphs_from_pdf(&args.report_pdf, &paragraph_options)?;
    if paragraphs.is_empty() {
        warn!(path = %args.report_pdf.display(), "no paragraphs extracted from report");
    }

    let mut encoder = create_encoder(resolve_model_config(
        &args.model.model_id,
        args.model.dimensions,
    ))?;
    let requirement_units = encode_units(
        encoder.as_mut(),
        flatten_requirements(&document.requirements),
    )?;
    let report_units = encode_units(encoder.as_mut(), paragraph_units(&paragraphs))?;
    let units = match_units(&requirement_units, &report_units, &match_options)?;

    let manifest = AnalysisManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        standard: standard_source,
        report: report_source,
        detected_standard: document.detection.standard,
        model: encoder.config().clone(),
        top_k: match_options.top_k,
        min_score: match_options.min_score,
        requirement_count: document.requirements.len(),
        unit_count: requirement_units.len(),
        paragraph_count: paragraphs.len(),
        duration_ms: started.elapsed().as_millis(),
        units,
    };

    info!(
        requirements = manifest.requirement_count,
        units = manifest.unit_count,
        paragraphs = manifest.paragraph_count,
        duration_ms = manifest.duration_ms,
        "analysis completed"
    );

    if let Some(path) = &args.output {
        write_json_pretty(path, &manifest)?;
        info!(path = %path.display(), "wrote analysis manifest");
    }

    if args.json {
        return write_json_stdout(&manifest);
    }

    write_text(&manifest)
}

fn write_text(manifest: &AnalysisManifest) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(
        output,
        "Standard: {} ({}) requirements={} units={}",
        manifest.standard.path,
        manifest.detected_standard.as_str(),
        manifest.requirement_count,
        manifest.unit_count
    )?;
    writeln!(
        output,
        "Report: {} paragraphs={}",
        manifest.report.path, manifest.paragraph_count
    )?;
    writeln!(
        output,
        "Model: {} dimensions={} top_k={} min_score={:.2}",
        manifest.model.model_id,
        manifest.model.dimensions,
        manifest.top_k,
        manifest.min_score
    )?;

    for unit in &manifest.units {
        writeln!(output)?;
        writeln!(output, "{}\t{}", unit.unit_id, preview(&unit.text, PREVIEW_CHARS))?;
        if unit.matches.is_empty() {
            writeln!(output, "\t(no matching paragraph)")?;
        }
        for hit in &unit.matches {
            writeln!(
                output,
                "\t{:.3}\tp{}\t{}",
                hit.score,
                hit.paragraph_index,
                preview(&hit.paragraph, PREVIEW_CHARS)
            )?;
        }
    }

    output.flush()?;
    Ok(())
}
