use crate::error::Result;
use crate::model::{Decoded, GenotypeMatrix, VariantRecord, VariantType, decode_genotype};
use crate::output::SummaryWriter;
use crate::reader::SiteReader;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::Write;

const DIPLOID: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummary {
    /// 1-based
    pub position: i64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub variant_type: VariantType,
    pub hom_ref: u64,
    pub het: u64,
    pub hom_alt: u64,
    pub missing: u64,
}

impl VariantSummary {
    pub fn n_samples(&self) -> u64 {
        self.hom_ref + self.het + self.hom_alt + self.missing
    }
}

/// Bucket every sample of one record. Returns `None` when the record has no
/// genotypes or is not diploid; such records are left out of the output.
pub fn classify(record: &VariantRecord, matrix: &GenotypeMatrix) -> Option<VariantSummary> {
    if !matrix.is_available() || matrix.ploidy() != DIPLOID {
        return None;
    }

    let (mut hom_ref, mut het, mut hom_alt, mut missing) = (0, 0, 0, 0);
    for sample_idx in 0..matrix.n_samples() {
        let codes = matrix.sample(sample_idx);
        match decode_genotype(codes[0], codes[1]) {
            Decoded::Usable(gt) => {
                tracing::trace!(
                    sample_idx,
                    dosage = gt.alt_dosage(),
                    phased = gt.phased,
                    "usable call"
                );
                match gt.alt_dosage() {
                    0 => hom_ref += 1,
                    1 => het += 1,
                    _ => hom_alt += 1,
                }
            }
            Decoded::Missing | Decoded::InvalidAllele => missing += 1,
        }
    }

    let summary = VariantSummary {
        position: record.position + 1,
        ref_allele: record.alleles.first().cloned().unwrap_or_default(),
        alt_allele: record
            .alleles
            .get(1)
            .cloned()
            .unwrap_or_else(|| ".".to_string()),
        variant_type: record.variant_type,
        hom_ref,
        het,
        hom_alt,
        missing,
    };
    debug_assert_eq!(summary.n_samples(), matrix.n_samples() as u64);
    Some(summary)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub n_records: u64,
    pub n_emitted: u64,
    pub n_skipped_ploidy: u64,
    pub n_skipped_no_genotypes: u64,
}

impl RunStats {
    fn record(&mut self, matrix: &GenotypeMatrix, summary: &Option<VariantSummary>) {
        self.n_records += 1;
        if summary.is_some() {
            self.n_emitted += 1;
        } else if !matrix.is_available() {
            self.n_skipped_no_genotypes += 1;
        } else {
            self.n_skipped_ploidy += 1;
        }
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {spinner} {pos} sites ({per_sec})",
    )?);
    Ok(pb)
}

/// Stream every record through [`classify`], writing summaries as they come.
/// A single matrix is reused for the whole run.
pub fn consume_reader<W: Write>(
    reader: &mut dyn SiteReader,
    writer: &mut SummaryWriter<W>,
) -> Result<RunStats> {
    let pb = progress_bar()?;
    let mut stats = RunStats::default();
    let mut matrix = GenotypeMatrix::new();

    while let Some(record) = reader.read_site(&mut matrix)? {
        let summary = classify(&record, &matrix);
        stats.record(&matrix, &summary);
        match &summary {
            Some(summary) => writer.write_summary(summary)?,
            None => tracing::debug!(
                chrom = %record.chrom,
                pos = record.position + 1,
                ploidy = matrix.ploidy(),
                "skipping record"
            ),
        }
        pb.inc(1);
    }
    pb.abandon();
    tracing::debug!(buffer_capacity = matrix.capacity(), "genotype buffer size");
    Ok(stats)
}

/// Same as [`consume_reader`], but classifies batches of records on the rayon
/// pool. Reading and writing stay sequential so output order matches input.
pub fn consume_reader_parallel<W: Write>(
    reader: &mut dyn SiteReader,
    writer: &mut SummaryWriter<W>,
    batch_size: usize,
) -> Result<RunStats> {
    let pb = progress_bar()?;
    let mut stats = RunStats::default();
    let mut batch: Vec<(VariantRecord, GenotypeMatrix)> = Vec::with_capacity(batch_size);

    loop {
        let n_read = fill_batch(reader, &mut batch, batch_size)?;
        if n_read == 0 {
            break;
        }

        let summaries: Vec<Option<VariantSummary>> = batch[..n_read]
            .par_iter()
            .map(|(record, matrix)| classify(record, matrix))
            .collect();

        for ((record, matrix), summary) in batch[..n_read].iter().zip(&summaries) {
            stats.record(matrix, summary);
            match summary {
                Some(summary) => writer.write_summary(summary)?,
                None => tracing::debug!(
                    chrom = %record.chrom,
                    pos = record.position + 1,
                    ploidy = matrix.ploidy(),
                    "skipping record"
                ),
            }
        }
        pb.inc(n_read as u64);

        if n_read < batch_size {
            break;
        }
    }
    pb.abandon();
    Ok(stats)
}

/// Read up to `batch_size` records into the reusable slots of `batch`.
fn fill_batch(
    reader: &mut dyn SiteReader,
    batch: &mut Vec<(VariantRecord, GenotypeMatrix)>,
    batch_size: usize,
) -> Result<usize> {
    for slot in 0..batch_size {
        if slot == batch.len() {
            batch.push(Default::default());
        }
        let (record, matrix) = &mut batch[slot];
        match reader.read_site(matrix)? {
            Some(next) => *record = next,
            None => return Ok(slot),
        }
    }
    Ok(batch_size)
}
