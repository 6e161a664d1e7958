use std::path::PathBuf;

use clap::Parser;

/// Find and replace text in Word documents, keeping their formatting
#[derive(Parser, Debug)]
#[command(
    name = "docsplice",
    about = "Format-preserving batch find-and-replace for .docx files",
    long_about = "Replaces literal text in Word (.docx) documents, including text split across\n\
                  differently formatted runs and text inside nested tables. Every file is backed\n\
                  up before it is changed unless --no-backup is given.",
    version
)]
pub struct Args {
    /// Documents or directories to process
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Text to find (repeatable, paired in order with --replace)
    #[arg(short, long = "find", value_name = "TEXT")]
    pub find: Vec<String>,

    /// Replacement text (repeatable, paired in order with --find)
    #[arg(short, long = "replace", value_name = "TEXT", allow_hyphen_values = true)]
    pub replace: Vec<String>,

    /// YAML file with a list of {find, replace} rules, applied after --find/--replace pairs
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Descend into subdirectories of directory arguments
    #[arg(short = 'R', long)]
    pub recursive: bool,

    /// Directory for backups (default: next to each document)
    #[arg(long, value_name = "DIR", conflicts_with = "no_backup")]
    pub backup_dir: Option<PathBuf>,

    /// Do not write backups
    #[arg(long)]
    pub no_backup: bool,

    /// Number of documents processed in parallel
    #[arg(short = 'j', long, value_name = "N")]
    pub workers: Option<usize>,

    /// YAML options file (environment variables and flags override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the batch summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Suppress per-file progress lines
    #[arg(short, long)]
    pub quiet: bool,
}
