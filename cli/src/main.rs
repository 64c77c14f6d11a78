//! A CLI tool for extracting DICOM metadata and sorting files
//! into a study/series/acquisition layout.
//!
//! Files are decoded in parallel, grouped under a single writer,
//! and reported as a canonical JSON summary plus an optional
//! source → destination move plan. The tool itself never moves files.
use clap::Parser;
use dcmsort_core::FileRecord;
use dcmsort_organize::{
    group, plan, summarize_to_string, summarize_to_string_pretty, CollisionPolicy, NamingTemplate,
    PathPlan,
};
use dcmsort_parser::{decode_bytes, looks_like_dicom, DecodeError, DecodeOptions, Mode};
use rayon::prelude::*;
use serde_json::json;
use snafu::{Report, ResultExt, Whatever};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use walkdir::WalkDir;

/// Exit code for when no input file could be decoded.
const ERROR_NOTHING_DECODED: i32 = 2;

/// Extract DICOM metadata and plan a sorted file layout
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The DICOM file(s) or directories to scan
    #[clap(required = true)]
    paths: Vec<PathBuf>,
    /// Keep partial records from truncated files
    /// instead of failing them
    #[clap(long = "best-effort")]
    best_effort: bool,
    /// Also try files without a preamble and DICM marker
    #[clap(long = "headerless")]
    headerless: bool,
    /// Ceiling on sequence nesting depth
    #[clap(long = "max-depth", default_value = "16")]
    max_depth: u32,
    /// Naming template for planned destination paths
    #[clap(
        short = 't',
        long = "template",
        default_value = "{PatientName}/{StudyDate}/{SeriesNumber}_{SeriesDescription}/{AcquisitionNumber}"
    )]
    template: String,
    /// What to do when two files plan to the same destination
    /// (skip, overwrite, rename)
    #[clap(long = "on-collision", default_value = "rename")]
    on_collision: String,
    /// Write the JSON summary to this file
    /// (default is standard output)
    #[clap(short = 's', long = "summary")]
    summary: Option<PathBuf>,
    /// Also emit the planned source → destination table,
    /// to this file or `-` for standard output
    #[clap(short = 'p', long = "plan")]
    plan: Option<PathBuf>,
    /// Pretty-print JSON output
    #[clap(long = "pretty")]
    pretty: bool,
    /// Verbose mode
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,
}

/// What became of one scanned file.
enum Outcome {
    Decoded(FileRecord),
    /// Not a DICOM file; silently left alone.
    Skipped,
    Failed(DecodeError),
}

fn main() {
    run().unwrap_or_else(|e| {
        eprintln!("[ERROR] {}", Report::from_error(e));
        std::process::exit(-2);
    });
}

fn run() -> Result<(), Whatever> {
    let app = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::builder()
                    .with_default_directive(
                        if app.verbose {
                            LevelFilter::DEBUG
                        } else {
                            LevelFilter::INFO
                        }
                        .into(),
                    )
                    .from_env_lossy(),
            )
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    let template: NamingTemplate = app
        .template
        .parse()
        .whatever_context("Invalid naming template")?;
    let on_collision: CollisionPolicy = app
        .on_collision
        .parse()
        .whatever_context("Invalid collision policy")?;

    let options = DecodeOptions {
        mode: if app.best_effort {
            Mode::BestEffort
        } else {
            Mode::Strict
        },
        headerless: app.headerless,
        max_depth: app.max_depth,
    };

    let files = collect_files(&app.paths);
    info!("Scanning {} file(s)", files.len());

    // decoding is independent per file; grouping happens afterwards
    // under a single writer
    let outcomes: Vec<(PathBuf, Outcome)> = files
        .into_par_iter()
        .map(|path| {
            let outcome = scan_file(&path, &options);
            (path, outcome)
        })
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for (path, outcome) in outcomes {
        match outcome {
            Outcome::Decoded(record) => records.push(record),
            Outcome::Skipped => skipped += 1,
            Outcome::Failed(e) => {
                warn!("{}: {}", path.display(), Report::from_error(e));
                failed += 1;
            }
        }
    }

    let decoded = records.len();
    let (tree, diagnostics) = group(records);
    for diagnostic in &diagnostics {
        warn!("{}", diagnostic);
    }
    let incomplete = tree
        .studies()
        .flat_map(|st| st.series())
        .filter(|s| s.is_incomplete(tree.policy()))
        .count();

    let summary = if app.pretty {
        summarize_to_string_pretty(&tree)
    } else {
        summarize_to_string(&tree)
    };
    match &app.summary {
        Some(path) => std::fs::write(path, summary)
            .with_whatever_context(|_| format!("Could not write summary to {}", path.display()))?,
        None => println!("{}", summary),
    }

    if let Some(path) = &app.plan {
        let path_plan = plan(&tree, &template, on_collision)
            .whatever_context("Could not plan destination paths")?;
        let rendered = render_plan(&path_plan, app.pretty);
        if path.as_os_str() == "-" {
            println!("{}", rendered);
        } else {
            std::fs::write(path, rendered).with_whatever_context(|_| {
                format!("Could not write plan to {}", path.display())
            })?;
        }
    }

    info!(
        "{} decoded, {} skipped, {} failed, {} excluded, {} incomplete series",
        decoded,
        skipped,
        failed,
        diagnostics.len(),
        incomplete
    );

    if decoded == 0 {
        std::process::exit(ERROR_NOTHING_DECODED);
    }
    Ok(())
}

/// Expand directories recursively; plain files pass through untouched.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| !e.file_type().is_dir())
            {
                files.push(entry.into_path());
            }
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files
}

fn scan_file(path: &PathBuf, options: &DecodeOptions) -> Outcome {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            return Outcome::Failed(DecodeError::ReadFile {
                path: path.clone(),
                source: e,
            })
        }
    };
    if !looks_like_dicom(&data, options.headerless) {
        return Outcome::Skipped;
    }
    match decode_bytes(&data, path, options) {
        Ok(record) => Outcome::Decoded(record),
        Err(e) => Outcome::Failed(e),
    }
}

fn render_plan(path_plan: &PathPlan, pretty: bool) -> String {
    let entries: Vec<serde_json::Value> = path_plan
        .entries()
        .iter()
        .map(|(from, to)| {
            json!({
                "from": from.to_string_lossy(),
                "to": to.to_string_lossy(),
            })
        })
        .collect();
    let value = json!({ "moves": entries });
    if pretty {
        serde_json::to_string_pretty(&value).expect("plan value serializes")
    } else {
        serde_json::to_string(&value).expect("plan value serializes")
    }
}
