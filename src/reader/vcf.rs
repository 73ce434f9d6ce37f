use std::io::{self, BufRead};
use std::path::Path;

use noodles::vcf::variant::record::samples::keys::key;
use noodles::vcf::variant::record::samples::series::value::genotype::Phasing;
use noodles::vcf::variant::record_buf::samples::sample::Value;
use noodles::vcf::variant::record_buf::samples::sample::value::Genotype;
use noodles::vcf::variant::record_buf::{RecordBuf, Samples};
use noodles::{bcf, vcf};

use crate::error::{CustomError, Result};
use crate::model::genotype::{self, GenotypeCode, MISSING};
use crate::model::{GenotypeMatrix, VariantRecord, VariantType};
use crate::reader::SiteReader;
use crate::reader::input::{InputFormat, detect_format, open_input};
use crate::reader::samples::select_samples;

// POS=0 marks a telomere and has no 1-based start
const TELOMERE: i64 = -1;

// Largest allele index whose code still fits in an i32
const MAX_ALLELE_INDEX: i32 = (i32::MAX >> 1) - 1;

enum Source {
    Vcf(vcf::io::Reader<Box<dyn BufRead + Send>>),
    Bcf(bcf::io::Reader<Box<dyn BufRead + Send>>),
}

impl Source {
    fn read_record_buf(
        &mut self,
        header: &vcf::Header,
        record: &mut RecordBuf,
    ) -> io::Result<usize> {
        match self {
            Self::Vcf(reader) => reader.read_record_buf(header, record),
            Self::Bcf(reader) => reader.read_record_buf(header, record),
        }
    }
}

/// Streaming reader over VCF or BCF (plain, gzip or BGZF). Only the fixed
/// columns and the GT value of each kept sample are looked at.
pub struct VcfReader {
    source: Source,
    header: vcf::Header,
    samples: Vec<String>,
    sample_indices_to_keep: Option<Vec<usize>>,
    record: RecordBuf,
    n_records: u64,
    n_malformed: u64,
}

impl VcfReader {
    pub fn open(path: &impl AsRef<Path>, samples_to_keep: Option<Vec<String>>) -> Result<Self> {
        let (format, reader) = open_input(path.as_ref())?;
        Self::new(format, reader, samples_to_keep)
    }

    pub fn from_reader(
        reader: Box<dyn BufRead + Send>,
        samples_to_keep: Option<Vec<String>>,
    ) -> Result<Self> {
        let (format, reader) = detect_format(reader)?;
        Self::new(format, reader, samples_to_keep)
    }

    fn new(
        format: InputFormat,
        reader: Box<dyn BufRead + Send>,
        samples_to_keep: Option<Vec<String>>,
    ) -> Result<Self> {
        // The gzip/BGZF layer is already gone, so BCF is read as a raw stream
        let (source, header) = match format {
            InputFormat::Vcf => {
                let mut reader = vcf::io::Reader::new(reader);
                let header = reader
                    .read_header()
                    .map_err(|source| CustomError::VcfHeader { source })?;
                (Source::Vcf(reader), header)
            }
            InputFormat::Bcf => {
                let mut reader = bcf::io::Reader::from(reader);
                let header = reader
                    .read_header()
                    .map_err(|source| CustomError::VcfHeader { source })?;
                (Source::Bcf(reader), header)
            }
        };

        let samples: Vec<String> = header.sample_names().iter().cloned().collect();
        if samples.is_empty() {
            tracing::warn!("header lists no samples; every record will be skipped");
        }

        // Overwrite samples with the filtered set and keep their header indices
        let (samples, sample_indices_to_keep) = select_samples(samples, samples_to_keep)?;
        tracing::debug!(?format, n_samples = samples.len(), "read header");

        Ok(Self {
            source,
            header,
            samples,
            sample_indices_to_keep,
            record: RecordBuf::default(),
            n_records: 0,
            n_malformed: 0,
        })
    }

    fn header_index(&self, kept_idx: usize) -> usize {
        match &self.sample_indices_to_keep {
            Some(indices) => indices[kept_idx],
            None => kept_idx,
        }
    }
}

impl SiteReader for VcfReader {
    fn samples(&self) -> &[String] {
        &self.samples
    }

    fn read_site(&mut self, genotypes: &mut GenotypeMatrix) -> Result<Option<VariantRecord>> {
        loop {
            match self.source.read_record_buf(&self.header, &mut self.record) {
                Ok(0) => {
                    if self.n_malformed > 0 {
                        tracing::warn!(
                            n_malformed = self.n_malformed,
                            "skipped malformed records"
                        );
                    }
                    return Ok(None);
                }
                Ok(_) => self.n_records += 1,
                // A bad text line is consumed whole, so the next one can still be read
                Err(e)
                    if e.kind() == io::ErrorKind::InvalidData
                        && matches!(self.source, Source::Vcf(_)) =>
                {
                    self.n_records += 1;
                    self.n_malformed += 1;
                    tracing::warn!(record = self.n_records, error = %e, "skipping malformed record");
                    continue;
                }
                Err(source) => {
                    return Err(CustomError::VcfRecord {
                        source,
                        record_num: self.n_records + 1,
                    });
                }
            }

            let record = variant_record(&self.record);
            fill_genotypes(
                self.record.samples(),
                self.samples.len(),
                |i| self.header_index(i),
                genotypes,
            );
            return Ok(Some(record));
        }
    }
}

fn variant_record(record: &RecordBuf) -> VariantRecord {
    let alt_bases: &[String] = record.alternate_bases().as_ref();
    let mut alleles = Vec::with_capacity(1 + alt_bases.len());
    alleles.push(record.reference_bases().to_string());
    alleles.extend(alt_bases.iter().cloned());
    let variant_type = VariantType::from_alleles(alleles.as_slice());

    let position = record
        .variant_start()
        .map_or(TELOMERE, |start| usize::from(start) as i64 - 1);

    VariantRecord {
        chrom: record.reference_sequence_name().to_string(),
        position,
        alleles,
        variant_type,
    }
}

/// Encode the GT value of every kept sample into `matrix`. The matrix ploidy
/// is the largest number of alleles any sample carries on this record.
fn fill_genotypes(
    samples: &Samples,
    n_samples: usize,
    header_index: impl Fn(usize) -> usize,
    matrix: &mut GenotypeMatrix,
) {
    if n_samples == 0 || !samples.keys().as_ref().contains(key::GENOTYPE) {
        matrix.mark_unavailable();
        return;
    }

    // A sample without a usable GT is a single missing allele
    let ploidy = (0..n_samples)
        .map(|i| {
            sample_genotype(samples, header_index(i)).map_or(1, |gt| gt.as_ref().len().max(1))
        })
        .max()
        .unwrap_or(0);
    matrix.reset(n_samples, ploidy);

    for sample_idx in 0..n_samples {
        match sample_genotype(samples, header_index(sample_idx)) {
            Some(gt) if !gt.as_ref().is_empty() => {
                for (slot, allele) in gt.as_ref().iter().enumerate() {
                    let phased = slot > 0 && matches!(allele.phasing(), Phasing::Phased);
                    matrix.set(sample_idx, slot, encode_allele(allele.position(), phased));
                }
            }
            _ => matrix.set(sample_idx, 0, MISSING),
        }
    }
}

fn sample_genotype(samples: &Samples, header_idx: usize) -> Option<&Genotype> {
    match samples.get_index(header_idx)?.get(key::GENOTYPE) {
        Some(Some(Value::Genotype(genotype))) => Some(genotype),
        _ => None,
    }
}

/// The first allele never carries a phase bit, as in htslib.
fn encode_allele(position: Option<usize>, phased: bool) -> GenotypeCode {
    let phase_bit = GenotypeCode::from(phased);
    match position.map(i32::try_from) {
        None => MISSING | phase_bit,
        Some(Ok(allele)) if allele <= MAX_ALLELE_INDEX => genotype::unphased(allele) | phase_bit,
        Some(_) => {
            tracing::trace!(?position, "allele index out of range, treating as missing");
            MISSING
        }
    }
}
