//! Command-line front-end for batch replacement.
//!
//! ```sh
//! docsplice -f 2024 -r 2025 reports/ --recursive --backup-dir backups/
//! docsplice --rules rules.yaml --json contract.docx
//! ```
//!
//! Exit status: 0 when every document succeeded, 1 when any failed, 2 on
//! usage or configuration errors.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::error;

use docsplice::batch::{BatchCoordinator, BatchOptions, BatchSummary, expand_inputs, load_rules};
use docsplice::common::{Error, Result};
use docsplice::replace::rules_from_pairs;

use crate::cli::Args;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let summary = match run(&args) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        },
    };

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("cannot encode summary: {}", e);
                return ExitCode::from(2);
            },
        }
    } else {
        print_summary(&summary);
    }

    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn options(args: &Args) -> Result<BatchOptions> {
    let mut options = match &args.config {
        Some(path) => BatchOptions::from_yaml_file(path)?,
        None => BatchOptions::default(),
    }
    .apply_env();

    if let Some(dir) = &args.backup_dir {
        options = options.with_backup_dir(Some(dir));
    }
    if args.no_backup {
        options = options.with_backup_enabled(false);
    }
    if let Some(n) = args.workers {
        options = options.with_max_workers(n);
    }
    Ok(options)
}

fn run(args: &Args) -> Result<BatchSummary> {
    let options = options(args)?;

    let mut rules = rules_from_pairs(&args.find, &args.replace)?;
    if let Some(path) = &args.rules {
        rules.extend(load_rules(path)?);
    }
    if rules.is_empty() {
        return Err(Error::Config("no rules given; use --find/--replace or --rules".to_string()));
    }

    let paths = expand_inputs(&args.paths, args.recursive)?;
    if paths.is_empty() {
        return Err(Error::Config("no .docx files found".to_string()));
    }

    let quiet = args.quiet || args.json;
    let mut coordinator = BatchCoordinator::new(options).on_result(|result| {
        if quiet {
            return;
        }
        if result.success {
            eprintln!("ok    {} ({})", result.path.display(), result.message);
        } else {
            eprintln!("FAIL  {}: {}", result.path.display(), result.message);
        }
    });
    if !quiet {
        coordinator = coordinator.on_progress(|done, total| eprintln!("[{}/{}]", done, total));
    }
    Ok(coordinator.process(&paths, &rules))
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "{} file(s): {} succeeded, {} failed, {} replacement(s)",
        summary.total,
        summary.success,
        summary.failure,
        summary.total_replacements()
    );
    for result in summary.failed() {
        println!("  {}: {}", result.path.display(), result.message);
    }
    for result in summary.succeeded() {
        if let Some(backup) = &result.backup_path {
            println!("  {} -> backup {}", result.path.display(), backup.display());
        }
    }
}
