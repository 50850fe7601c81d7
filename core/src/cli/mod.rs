pub mod report;

use crate::config::LabelerConfig;
use crate::error::Result;
use crate::navigation::ResumePolicy;
use crate::types::{CategoryTaxonomy, MediaKind};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for viewtag
#[derive(Parser, Debug)]
#[command(name = "viewtag")]
#[command(about = "Label echocardiography videos and DICOM cine loops by view")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the labeling window
    Label(LabelArgs),

    /// Scan the media directory and create or extend the annotation store
    Scan(SourceArgs),

    /// Show labeling progress
    Status(SourceArgs),

    /// Show label counts, optionally writing the Summary sheet
    Summary(SummaryArgs),

    /// List the view categories
    Categories(TaxonomyArgs),
}

/// Media source selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Media variant to label
    #[arg(short, long, default_value = "video")]
    pub source: SourceArg,

    /// Media directory (defaults to <Desktop>/videos or <Desktop>/dicom)
    #[arg(short, long, value_name = "DIRECTORY")]
    pub dir: Option<PathBuf>,

    /// Annotation workbook (defaults to <Desktop>/<source>_names.xlsx)
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TaxonomyArgs {
    /// TOML file replacing the built-in view categories
    #[arg(short, long, value_name = "FILE")]
    pub taxonomy: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LabelArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub taxonomy: TaxonomyArgs,

    /// Wrap around to earlier unclassified files after the last one
    #[arg(long)]
    pub wrap_resume: bool,

    /// Video redraw interval in milliseconds
    #[arg(long, default_value_t = 30, value_name = "MS")]
    pub interval_ms: u64,

    /// Font file with CJK glyphs for the category list
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Also write the Summary sheet into the workbook
    #[arg(short, long)]
    pub write: bool,
}

/// Media variant options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SourceArg {
    /// Video files decoded with FFmpeg
    Video,
    /// Multi-frame DICOM files
    Dicom,
}

impl From<SourceArg> for MediaKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Video => MediaKind::Video,
            SourceArg::Dicom => MediaKind::Dicom,
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

impl SourceArgs {
    /// Desktop defaults with the given overrides applied
    pub fn to_config(&self) -> LabelerConfig {
        let mut config = LabelerConfig::for_kind(self.source.into());
        if let Some(dir) = &self.dir {
            config.media_dir = dir.clone();
        }
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        config
    }
}

impl TaxonomyArgs {
    pub fn load(&self) -> Result<CategoryTaxonomy> {
        match &self.taxonomy {
            Some(path) => CategoryTaxonomy::from_toml_file(path),
            None => Ok(CategoryTaxonomy::default()),
        }
    }
}

impl LabelArgs {
    pub fn to_config(&self) -> Result<LabelerConfig> {
        let mut config = self.source.to_config();
        config.taxonomy = self.taxonomy.load()?;
        config.resume_policy = if self.wrap_resume {
            ResumePolicy::Wrap
        } else {
            ResumePolicy::ForwardOnly
        };
        config.frame_interval = Duration::from_millis(self.interval_ms.max(1));
        config.font_path = self.font.clone();
        Ok(config)
    }
}
