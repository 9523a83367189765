use std::io::{self, Write};

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::cli::RequirementsArgs;
use crate::commands::{MANIFEST_VERSION, describe_source};
use crate::model::{Requirement, RequirementsManifest};
use crate::standard::{DetectorOptions, read_standard_pdf};
use crate::util::{now_utc_string, write_json_pretty, write_json_stdout};

pub fn run(args: RequirementsArgs) -> Result<()> {
    let source = describe_source(&args.standard_pdf)?;
    let document = read_standard_pdf(&args.standard_pdf, DetectorOptions::default())?;

    if document.requirements.is_empty() {
        warn!(path = %args.standard_pdf.display(), "no requirements extracted");
    }

    let manifest = RequirementsManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source,
        detected_standard: document.detection.standard,
        requirement_count: document.requirements.len(),
        sub_point_count: document
            .requirements
            .iter()
            .map(|requirement| requirement.sub_points.len())
            .sum(),
        requirements: document.requirements,
    };

    if let Some(path) = &args.output {
        write_json_pretty(path, &manifest)?;
        info!(path = %path.display(), "wrote requirements manifest");
    }

    if let Some(code) = &args.code {
        let Some(requirement) = manifest.requirements.get(code) else {
            bail!(
                "requirement {code} not found; extracted codes: {}",
                manifest.requirements.codes().join(", ")
            );
        };

        if args.json {
            return write_json_stdout(requirement);
        }
        let mut output = io::BufWriter::new(io::stdout().lock());
        write_requirement(&mut output, requirement)?;
        output.flush()?;
        return Ok(());
    }

    if args.json {
        return write_json_stdout(&manifest);
    }

    write_text(&manifest)
}

fn write_text(manifest: &RequirementsManifest) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(
        output,
        "Standard: {} requirements={} sub_points={}",
        manifest.detected_standard.as_str(),
        manifest.requirement_count,
        manifest.sub_point_count
    )?;

    for requirement in manifest.requirements.iter() {
        writeln!(output)?;
        write_requirement(&mut output, requirement)?;
    }

    output.flush()?;
    Ok(())
}

fn write_requirement(output: &mut impl Write, requirement: &Requirement) -> Result<()> {
    writeln!(output, "{}\t{}", requirement.code, requirement.full_designation)?;
    if requirement.sub_points.is_empty() {
        writeln!(output, "\t{}", requirement.full_text)?;
    }
    for sub_point in &requirement.sub_points {
        writeln!(output, "\t{sub_point}")?;
    }
    Ok(())
}
