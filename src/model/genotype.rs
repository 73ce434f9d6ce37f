/// Genotype codes use the htslib BCF encoding: allele index `k` is stored as
/// `(k + 1) << 1`, with the low bit set when the allele is phased with respect
/// to the previous one.
pub type GenotypeCode = i32;

/// No call for this allele.
pub const MISSING: GenotypeCode = 0;
/// The sample has fewer alleles than the matrix ploidy.
pub const VECTOR_END: GenotypeCode = i32::MIN + 1;

pub const fn unphased(allele: i32) -> GenotypeCode {
    (allele + 1) << 1
}

pub const fn phased(allele: i32) -> GenotypeCode {
    ((allele + 1) << 1) | 1
}

pub const fn allele_index(code: GenotypeCode) -> i32 {
    (code >> 1) - 1
}

pub const fn is_phased(code: GenotypeCode) -> bool {
    code & 1 != 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedGenotype {
    pub allele_a: u8,
    pub allele_b: u8,
    pub phased: bool,
}

impl DecodedGenotype {
    /// Number of alternate alleles carried (0, 1 or 2).
    pub fn alt_dosage(self) -> u8 {
        self.allele_a + self.allele_b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Usable(DecodedGenotype),
    /// First or second code is missing, or the sample is haploid.
    Missing,
    /// An allele resolved to something other than REF or the first ALT.
    InvalidAllele,
}

/// Decode the first two codes of one sample.
///
/// Only the second code is checked for `VECTOR_END`. A `VECTOR_END` in the
/// first slot falls through to the allele range check and comes back as
/// `InvalidAllele`, so either way the sample is not counted.
pub fn decode_genotype(code0: GenotypeCode, code1: GenotypeCode) -> Decoded {
    if code0 == MISSING {
        return Decoded::Missing;
    }
    if code1 == MISSING || code1 == VECTOR_END {
        return Decoded::Missing;
    }

    // Phase lives on the second allele
    let phased = is_phased(code1);
    let (Some(allele_a), Some(allele_b)) =
        (biallelic_index(allele_index(code0)), biallelic_index(allele_index(code1)))
    else {
        return Decoded::InvalidAllele;
    };

    Decoded::Usable(DecodedGenotype {
        allele_a,
        allele_b,
        phased,
    })
}

fn biallelic_index(allele: i32) -> Option<u8> {
    match allele {
        0 => Some(0),
        1 => Some(1),
        _ => None,
    }
}

/// Per-record genotype codes, `n_samples` rows of `ploidy` codes each.
///
/// The backing buffer is owned by whoever drives the reader and is reused
/// across records. It only ever grows.
#[derive(Debug, Default, Clone)]
pub struct GenotypeMatrix {
    codes: Vec<GenotypeCode>,
    n_samples: usize,
    ploidy: usize,
    available: bool,
}

impl GenotypeMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the matrix for a new record. Every slot starts as `VECTOR_END`.
    pub fn reset(&mut self, n_samples: usize, ploidy: usize) {
        let needed = n_samples * ploidy;
        if self.codes.len() < needed {
            self.codes.resize(needed, VECTOR_END);
        }
        self.codes[..needed].fill(VECTOR_END);
        self.n_samples = n_samples;
        self.ploidy = ploidy;
        self.available = true;
    }

    /// The record carries no genotypes at all.
    pub fn mark_unavailable(&mut self) {
        self.n_samples = 0;
        self.ploidy = 0;
        self.available = false;
    }

    pub fn set(&mut self, sample_idx: usize, slot: usize, code: GenotypeCode) {
        self.codes[sample_idx * self.ploidy + slot] = code;
    }

    pub fn sample(&self, sample_idx: usize) -> &[GenotypeCode] {
        let start = sample_idx * self.ploidy;
        &self.codes[start..start + self.ploidy]
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    pub fn capacity(&self) -> usize {
        self.codes.len()
    }
}
