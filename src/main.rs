use anyhow::{Context, Result};
use clap::Parser;
use faqreport::{
    process::process_report,
    sheets::{self, SheetBook},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Reshape GA-exported FAQ access reports into multi-sheet workbooks.
#[derive(Parser, Debug)]
#[command(name = "faqreport", version, about)]
struct Args {
    /// Input report CSVs, processed in the order given.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory the .xlsx workbooks are written to.
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;

    // ─── 2) process each file, strictly in order ─────────────────────
    let mut failures = 0usize;
    for input in &args.inputs {
        if let Err(err) = run_one(input, &args.out_dir) {
            // one bad file must not stop the rest of the batch
            error!(file = %input.display(), %err, "skipped");
            failures += 1;
        }
    }

    info!(
        total = args.inputs.len(),
        failed = failures,
        "batch complete"
    );
    if failures == args.inputs.len() {
        anyhow::bail!("every input file failed");
    }
    Ok(())
}

fn run_one(input: &Path, out_dir: &Path) -> Result<()> {
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());

    // single bounded read; undecodable bytes are replaced, not fatal
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let output = process_report(&file_name, &text)
        .with_context(|| format!("processing {}", file_name))?;

    for warning in &output.warnings {
        warn!(file = %file_name, "{}", warning);
    }
    if output.subsets.is_empty() {
        warn!(file = %file_name, "no subsets produced, nothing to write");
        return Ok(());
    }

    let mut book = SheetBook::new();
    for (name, table) in output.subsets {
        book.insert(&name, table);
    }

    let out_path = out_dir.join(format!(
        "{}.xlsx",
        input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "report".to_string())
    ));
    sheets::write_workbook(&book, &out_path)
        .with_context(|| format!("writing {}", out_path.display()))?;
    info!(file = %file_name, out = %out_path.display(), "done");
    Ok(())
}
