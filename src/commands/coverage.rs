use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::CoverageArgs;
use crate::commands::{MANIFEST_VERSION, describe_source, preview};
use crate::matcher::{flatten_requirements, paragraph_units, summarize_coverage, top_scores};
use crate::model::{CoverageManifest, EncodedUnit, SourceDocument};
use crate::report::{ParagraphOptions, extract_paragraphs_from_pdf};
use crate::semantic::{VectorEncoder, create_encoder, encode_units, resolve_model_config};
use crate::standard::extract_requirements_from_standard_pdf;
use crate::util::{now_utc_string, write_json_pretty, write_json_stdout};

const PREVIEW_CHARS: usize = 120;

pub fn run(args: CoverageArgs) -> Result<()> {
    let paragraph_options = args.paragraphs.options();
    let standard_source = describe_source(&args.standard_pdf)?;
    let requirements = extract_requirements_from_standard_pdf(&args.standard_pdf)?;
    if requirements.is_empty() {
        warn!(path = %args.standard_pdf.display(), "no requirements extracted; coverage is empty");
    }

    let mut encoder = create_encoder(resolve_model_config(
        &args.model.model_id,
        args.model.dimensions,
    ))?;
    let units = encode_units(encoder.as_mut(), flatten_requirements(&requirements))?;

    let mut reports = Vec::with_capacity(args.report_pdfs.len());
    let mut per_report = Vec::with_capacity(args.report_pdfs.len());
    let mut skipped_reports = Vec::new();

    for report_pdf in &args.report_pdfs {
        match score_report(encoder.as_mut(), &units, report_pdf, &paragraph_options) {
            Ok(Some((source, scores))) => {
                reports.push(source);
                per_report.push(scores);
            }
            Ok(None) => {
                warn!(path = %report_pdf.display(), "report has no usable paragraphs; skipping");
                skipped_reports.push(report_pdf.display().to_string());
            }
            Err(error) => {
                warn!(
                    path = %report_pdf.display(),
                    error = %format!("{error:#}"),
                    "report could not be processed; skipping"
                );
                skipped_reports.push(report_pdf.display().to_string());
            }
        }
    }

    let rows = summarize_coverage(
        &units,
        &per_report,
        args.report_pdfs.len(),
        args.coverage_threshold,
    );

    info!(
        units = rows.len(),
        reports = reports.len(),
        skipped = skipped_reports.len(),
        "coverage completed"
    );

    let manifest = CoverageManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        standard: standard_source,
        reports,
        skipped_reports,
        model: encoder.config().clone(),
        coverage_threshold: args.coverage_threshold,
        rows,
    };

    if let Some(path) = &args.output {
        write_json_pretty(path, &manifest)?;
        info!(path = %path.display(), "wrote coverage manifest");
    }

    if args.json {
        return write_json_stdout(&manifest);
    }

    write_text(&manifest)
}

/// Top-1 score per unit for one report, or `None` when the report has no
/// paragraphs left after filtering.
fn score_report(
    encoder: &mut dyn VectorEncoder,
    units: &[EncodedUnit],
    report_pdf: &Path,
    options: &ParagraphOptions,
) -> Result<Option<(SourceDocument, Vec<Option<f64>>)>> {
    let source = describe_source(report_pdf)?;
    let paragraphs = extract_paragraphs_from_pdf(report_pdf, options)?;
    if paragraphs.is_empty() {
        return Ok(None);
    }

    let encoded = encode_units(encoder, paragraph_units(&paragraphs))?;
    let scores = top_scores(units, &encoded)?;
    Ok(Some((source, scores)))
}

fn write_text(manifest: &CoverageManifest) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(
        output,
        "Reports: {} processed, {} skipped, threshold={:.2}",
        manifest.reports.len(),
        manifest.skipped_reports.len(),
        manifest.coverage_threshold
    )?;
    for skipped in &manifest.skipped_reports {
        writeln!(output, "\tskipped: {skipped}")?;
    }

    writeln!(output)?;
    for row in &manifest.rows {
        writeln!(
            output,
            "{}\tavg={:.3}\tcovered={}/{}\t{}",
            row.unit_id,
            row.avg_max_score,
            row.reports_covered,
            row.reports_total,
            preview(&row.text, PREVIEW_CHARS)
        )?;
    }

    output.flush()?;
    Ok(())
}
