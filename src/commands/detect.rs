use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use crate::cli::DetectArgs;
use crate::commands::{MANIFEST_VERSION, describe_source};
use crate::model::{DetectionManifest, SourceDocument};
use crate::standard::detect_standard_from_pdf;
use crate::util::{now_utc_string, write_json_stdout};

pub fn run(args: DetectArgs) -> Result<()> {
    let options = args.detector_options();
    let scores = detect_standard_from_pdf(&args.standard_pdf, options);

    let source = describe_source(&args.standard_pdf).unwrap_or_else(|error| {
        warn!(error = %format!("{error:#}"), "could not hash standard pdf");
        SourceDocument {
            path: args.standard_pdf.display().to_string(),
            sha256: None,
        }
    });

    let manifest = DetectionManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source,
        threshold: options.threshold,
        esrs_score: scores.esrs_score,
        gri_score: scores.gri_score,
        detected_standard: scores.standard,
    };

    if args.json {
        return write_json_stdout(&manifest);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Standard: {}", manifest.detected_standard.as_str())?;
    writeln!(
        output,
        "Scores: esrs={:.3} gri={:.3} threshold={:.2}",
        manifest.esrs_score, manifest.gri_score, manifest.threshold
    )?;
    output.flush()?;
    Ok(())
}
