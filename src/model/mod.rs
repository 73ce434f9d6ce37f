pub mod genotype;
pub mod variant_type;

pub use genotype::{Decoded, GenotypeMatrix, decode_genotype};
pub use variant_type::VariantType;

/// Fixed columns of one VCF record. Genotypes travel separately in a
/// [`GenotypeMatrix`] so the buffer can be reused between records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    /// 0-based; -1 for a telomere (POS = 0)
    pub position: i64,
    /// REF first, then each ALT
    pub alleles: Vec<String>,
    pub variant_type: VariantType,
}
