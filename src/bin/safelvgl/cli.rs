//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// safelvgl - A thread-safety facade generator for LVGL
#[derive(Parser)]
#[command(name = "safelvgl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the thread-safe facade header and source
    Generate(GenerateArgs),

    /// List the function surface discovered in the toolkit headers
    List(ListArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path of the LVGL source tree
    #[arg(short, long)]
    pub lvgl: PathBuf,

    /// Output directory for the generated facade
    #[arg(short, long)]
    pub output: PathBuf,

    /// Toolkit version to stamp into the banners (skips probing lvgl.h)
    #[arg(long)]
    pub toolkit_version: Option<String>,

    /// Name wrappers with this prefix instead of interposing
    #[arg(long)]
    pub prefix: Option<String>,

    /// Prefix of the real symbol in interpose mode
    #[arg(long)]
    pub real_prefix: Option<String>,

    /// Regex of function names to exclude (repeatable)
    #[arg(long = "block-regex")]
    pub block_regex: Vec<String>,

    /// Path of a custom header template
    #[arg(long)]
    pub header: Option<PathBuf>,

    /// Path of a custom source template
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Path of a custom wrapper declaration template
    #[arg(long)]
    pub func_decl: Option<PathBuf>,

    /// Path of a custom wrapper definition template
    #[arg(long)]
    pub func_def: Option<PathBuf>,

    /// Parse and report without writing files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Path of the LVGL source tree
    #[arg(short, long)]
    pub lvgl: PathBuf,

    /// Regex of function names to exclude (repeatable)
    #[arg(long = "block-regex")]
    pub block_regex: Vec<String>,

    /// Show skipped declarations instead of the wrappable surface
    #[arg(long)]
    pub skipped: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
