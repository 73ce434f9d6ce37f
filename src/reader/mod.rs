pub mod input;
pub mod samples;
pub mod vcf;

use crate::error::Result;
use crate::model::{GenotypeMatrix, VariantRecord};

pub trait SiteReader: Send {
    fn samples(&self) -> &[String];

    /// Read the next record, filling `genotypes` with its GT codes. The
    /// matrix is marked unavailable when the record carries no GT field.
    fn read_site(&mut self, genotypes: &mut GenotypeMatrix) -> Result<Option<VariantRecord>>;
}
