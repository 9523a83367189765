use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::ParagraphsArgs;
use crate::commands::{MANIFEST_VERSION, describe_source};
use crate::model::ParagraphsManifest;
use crate::report::extract_paragraphs_from_pdf;
use crate::util::{now_utc_string, write_json_pretty, write_json_stdout};

pub fn run(args: ParagraphsArgs) -> Result<()> {
    let options = args.paragraphs.options();
    let source = describe_source(&args.report_pdf)?;
    let paragraphs = extract_paragraphs_from_pdf(&args.report_pdf, &options)?;

    let manifest = ParagraphsManifest {
        manifest_version: MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source,
        min_words: options.min_words,
        min_chars: options.min_chars,
        noise_filter: options.noise_filter,
        paragraph_count: paragraphs.len(),
        paragraphs,
    };

    if let Some(path) = &args.output {
        write_json_pretty(path, &manifest)?;
        info!(path = %path.display(), "wrote paragraphs manifest");
    }

    if args.json {
        return write_json_stdout(&manifest);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Paragraphs: {}", manifest.paragraph_count)?;
    for (index, paragraph) in manifest.paragraphs.iter().enumerate() {
        writeln!(output)?;
        writeln!(output, "[p{index}] {paragraph}")?;
    }
    output.flush()?;
    Ok(())
}
