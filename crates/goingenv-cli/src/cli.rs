//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "goingenv")]
#[command(author, version, about = "Pack environment files into encrypted, committable archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize goingenv in the current directory
    Init(InitArgs),
    /// Scan and pack environment files into an encrypted archive
    Pack(PackArgs),
    /// Decrypt and extract files from an archive
    Unpack(UnpackArgs),
    /// Show archive contents without extracting
    List(ListArgs),
    /// Show project state and detected environment files
    Status(StatusArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    /// Recreate bookkeeping files even if already initialized
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Encryption password (prompts if not provided)
    #[arg(short = 'k', long = "key", value_name = "PASSWORD")]
    pub key: Option<String>,

    /// Directory to scan
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Output archive name (default: timestamped name in .goingenv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum directory depth to scan (default: from config)
    #[arg(long)]
    pub depth: Option<usize>,

    /// File patterns to include instead of the configured ones
    #[arg(short, long, value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Additional directory patterns to exclude
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Archive description
    #[arg(long)]
    pub description: Option<String>,

    /// Show what would be packed without creating an archive
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct UnpackArgs {
    /// Decryption password (prompts if not provided)
    #[arg(short = 'k', long = "key", value_name = "PASSWORD")]
    pub key: Option<String>,

    /// Archive file to unpack (default: most recent)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Target directory for extraction
    #[arg(short, long, default_value = ".")]
    pub target: PathBuf,

    /// Overwrite existing files
    #[arg(long)]
    pub overwrite: bool,

    /// Rename existing files to <name>.backup before overwriting
    #[arg(long)]
    pub backup: bool,

    /// Skip checksum verification after extraction
    #[arg(long)]
    pub no_verify: bool,

    /// Only extract files whose name matches these patterns
    #[arg(short, long, value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Skip files whose name matches these patterns
    #[arg(short, long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Show what would be extracted without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Decryption password (prompts if not provided)
    #[arg(short = 'k', long = "key", value_name = "PASSWORD")]
    pub key: Option<String>,

    /// Archive file to inspect (default: most recent)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Show detailed file information
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    /// Directory to scan
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Maximum directory depth to scan (default: from config)
    #[arg(long)]
    pub depth: Option<usize>,
}
