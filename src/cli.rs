use crate::Args;
use crate::counts::{RunStats, consume_reader, consume_reader_parallel};
use crate::error::{CustomError, Result};
use crate::output::SummaryWriter;
use crate::reader::SiteReader;
use crate::reader::vcf::VcfReader;
use itertools::Itertools;
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

const PARALLEL_THRESHOLD: usize = 500;
const BATCH_SIZE: usize = 1024;

#[derive(Debug, Clone)]
pub struct InputSpec {
    input: PathBuf,
    output: Option<PathBuf>,
    samples: Option<Vec<String>>,
    threads: Option<usize>,
}

impl InputSpec {
    pub fn log_paths(&self) {
        let output = match &self.output {
            Some(path) => path.display().to_string(),
            None => "<stdout>".to_string(),
        };
        tracing::info!(input = %self.input.display(), %output, "classifying genotypes");
        if let Some(samples) = &self.samples {
            tracing::info!(n_samples = samples.len(), "restricting to requested samples");
        }
    }

    pub fn open_reader(&self) -> Result<Box<dyn SiteReader>> {
        let reader = VcfReader::open(&self.input, self.samples.clone())?;
        Ok(Box::new(reader))
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn threads(&self) -> Option<usize> {
        self.threads
    }
}

pub fn build_input_spec(args: &Args) -> Result<InputSpec> {
    let samples = match (&args.samples, &args.samples_file) {
        (Some(list), _) => Some(parse_sample_list(list)),
        (None, Some(path)) => Some(load_samples_file(path)?),
        (None, None) => None,
    };
    Ok(InputSpec {
        input: args.input.clone(),
        output: args.output.clone(),
        samples,
        threads: args.threads,
    })
}

pub fn parse_sample_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One sample name per line; blank lines and `#` comments are ignored.
fn load_samples_file(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|source| CustomError::CsvRead {
            source,
            path: path.to_path_buf(),
        })?;

    let mut samples = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| CustomError::CsvRead {
            source,
            path: path.to_path_buf(),
        })?;
        if let Some(name) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
            samples.push(name.to_string());
        }
    }
    Ok(samples)
}

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

pub fn run<W: Write + Send>(
    reader: &mut dyn SiteReader,
    writer: &mut SummaryWriter<W>,
    threads: Option<usize>,
) -> Result<RunStats> {
    writer.write_header()?;

    let n_samples = reader.samples().len();
    tracing::debug!(
        n_samples,
        first_samples = %reader.samples().iter().take(5).join(","),
        "starting scan"
    );

    let stats = if (threads.is_none() && n_samples < PARALLEL_THRESHOLD) || threads == Some(1) {
        consume_reader(reader, writer)?
    } else if let Some(n) = threads {
        let pool = ThreadPoolBuilder::new().num_threads(n).build()?;
        pool.install(|| consume_reader_parallel(reader, writer, BATCH_SIZE))?
    } else {
        consume_reader_parallel(reader, writer, BATCH_SIZE)?
    };

    tracing::info!(
        records = stats.n_records,
        emitted = stats.n_emitted,
        skipped_ploidy = stats.n_skipped_ploidy,
        skipped_no_genotypes = stats.n_skipped_no_genotypes,
        "done"
    );
    Ok(stats)
}
