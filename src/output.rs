use crate::counts::VariantSummary;
use crate::error::{CustomError, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const HEADER: [&str; 8] = ["pos", "ref", "alt", "type", "aa", "ab", "bb", "nmiss"];

/// Tab-separated summary table, one row per classified record.
pub struct SummaryWriter<W: Write> {
    wtr: csv::Writer<W>,
}

impl<W: Write> SummaryWriter<W> {
    pub fn new(inner: W) -> Self {
        let wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .has_headers(false)
            .from_writer(inner);
        Self { wtr }
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.wtr.write_record(HEADER)?;
        Ok(())
    }

    pub fn write_summary(&mut self, summary: &VariantSummary) -> Result<()> {
        self.wtr.serialize((
            summary.position,
            summary.ref_allele.as_str(),
            summary.alt_allele.as_str(),
            summary.variant_type.code(),
            summary.hom_ref,
            summary.het,
            summary.hom_alt,
            summary.missing,
        ))?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.wtr
            .flush()
            .map_err(|e| CustomError::Flush { source: e })?;
        self.wtr
            .into_inner()
            .map_err(|e| CustomError::Flush {
                source: e.into_error(),
            })
    }
}

/// Summaries go to `path` when given, stdout otherwise.
pub fn open_output(path: Option<&Path>) -> Result<SummaryWriter<Box<dyn Write + Send>>> {
    let inner: Box<dyn Write + Send> = match path {
        Some(path) => {
            let f = File::create(path).map_err(|e| CustomError::Write {
                source: e,
                path: path.to_path_buf(),
            })?;
            Box::new(BufWriter::new(f))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(SummaryWriter::new(inner))
}
