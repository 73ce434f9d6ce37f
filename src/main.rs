mod cli;
mod counts;
mod error;
mod model;
mod output;
mod reader;

use crate::error::Result;
use clap::Parser;
use miette::IntoDiagnostic;
use std::path::PathBuf;

/// Count hom-ref, het, hom-alt and missing genotypes at each biallelic VCF/BCF site.
///
/// Multi-allelic sites should be split first (e.g. `bcftools norm -m-`);
/// calls involving a second ALT allele are counted as missing.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Input VCF or BCF, plain or gzip/BGZF-compressed. Use "-" for stdin.
    #[arg(default_value = "-", value_hint = clap::ValueHint::FilePath)]
    input: PathBuf,

    /// Output file. Defaults to stdout.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Comma-separated list of samples to include.
    #[arg(short, long, conflicts_with = "samples_file")]
    samples: Option<String>,

    /// File with one sample name per line.
    #[arg(short = 'S', long, value_hint = clap::ValueHint::FilePath)]
    samples_file: Option<PathBuf>,

    /// Number of threads (0 lets rayon decide). Runs single-threaded for
    /// small cohorts unless set.
    #[arg(short, long)]
    threads: Option<usize>,

    /// Log filter for stderr, e.g. "info" or "debug". RUST_LOG takes precedence.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    cli::init_logging(&args.log_level);

    let input_spec = cli::build_input_spec(&args)?;
    input_spec.log_paths();

    let mut reader = input_spec.open_reader()?;
    let mut writer = output::open_output(input_spec.output())?;
    cli::run(reader.as_mut(), &mut writer, input_spec.threads())?;
    writer.finish()?;
    Ok(())
}

fn main() -> miette::Result<()> {
    try_main().into_diagnostic()
}
