use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::matcher::{DEFAULT_COVERAGE_THRESHOLD, DEFAULT_MIN_SCORE, DEFAULT_TOP_K, MatchOptions};
use crate::report::{DEFAULT_MIN_CHARS, DEFAULT_MIN_WORDS, ParagraphOptions};
use crate::semantic::{DEFAULT_EMBEDDING_DIM, DEFAULT_MODEL_ID};
use crate::standard::{DEFAULT_DETECTION_THRESHOLD, DetectorOptions};

#[derive(Parser, Debug)]
#[command(
    name = "esg-compliance",
    version,
    about = "Match ESRS and GRI disclosure requirements against sustainability reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a standard PDF as ESRS, GRI or UNKNOWN.
    Detect(DetectArgs),
    /// Extract the requirement catalogue from a standard PDF.
    Requirements(RequirementsArgs),
    /// Extract substantive paragraphs from a report PDF.
    Paragraphs(ParagraphsArgs),
    /// Rank report paragraphs against every requirement of a standard.
    Analyze(AnalyzeArgs),
    /// Summarize requirement coverage across several reports.
    Coverage(CoverageArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DetectArgs {
    #[arg(long)]
    pub standard_pdf: PathBuf,

    #[arg(long, default_value_t = DEFAULT_DETECTION_THRESHOLD)]
    pub threshold: f64,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl DetectArgs {
    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            threshold: self.threshold,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RequirementsArgs {
    #[arg(long)]
    pub standard_pdf: PathBuf,

    /// Show a single requirement, e.g. "G1-2" or "GRI 305-1".
    #[arg(long)]
    pub code: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ParagraphArgs {
    #[arg(long, default_value_t = DEFAULT_MIN_WORDS)]
    pub min_words: usize,

    #[arg(long, default_value_t = DEFAULT_MIN_CHARS)]
    pub min_chars: usize,

    #[arg(long, default_value_t = false)]
    pub no_noise_filter: bool,
}

impl ParagraphArgs {
    pub fn options(&self) -> ParagraphOptions {
        ParagraphOptions {
            min_words: self.min_words,
            min_chars: self.min_chars,
            noise_filter: !self.no_noise_filter,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIM)]
    pub dimensions: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ParagraphsArgs {
    #[arg(long)]
    pub report_pdf: PathBuf,

    #[command(flatten)]
    pub paragraphs: ParagraphArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub standard_pdf: PathBuf,

    #[arg(long)]
    pub report_pdf: PathBuf,

    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
    pub min_score: f64,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub paragraphs: ParagraphArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl AnalyzeArgs {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            top_k: self.top_k,
            min_score: self.min_score,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CoverageArgs {
    #[arg(long)]
    pub standard_pdf: PathBuf,

    #[arg(long = "report-pdf", required = true)]
    pub report_pdfs: Vec<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_COVERAGE_THRESHOLD)]
    pub coverage_threshold: f64,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub paragraphs: ParagraphArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}
