use std::fmt;
use std::ops::BitOr;

/// Variant classes as an htslib-compatible bitmask, OR-ed over all ALT alleles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariantType(u8);

impl VariantType {
    pub const REF: Self = Self(0);
    pub const SNP: Self = Self(1);
    pub const MNP: Self = Self(2);
    pub const INDEL: Self = Self(4);
    pub const OTHER: Self = Self(8);
    pub const BND: Self = Self(16);
    pub const OVERLAP: Self = Self(32);

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn from_alleles<S: AsRef<str>>(alleles: &[S]) -> Self {
        let Some((reference, alts)) = alleles.split_first() else {
            return Self::REF;
        };
        alts.iter().fold(Self::REF, |acc, alt| {
            acc | allele_type(reference.as_ref(), alt.as_ref())
        })
    }
}

impl BitOr for VariantType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classify a single REF/ALT pair by trimming their shared prefix and suffix.
fn allele_type(reference: &str, alt: &str) -> VariantType {
    if alt == "*" {
        return VariantType::OVERLAP;
    }
    let r = reference.as_bytes();
    let a = alt.as_bytes();

    if r.len() == 1 && a.len() == 1 {
        // mpileup's X allele is not a variant
        if a[0] == b'.' || a[0] == b'X' || a[0] == r[0] {
            return VariantType::REF;
        }
        return VariantType::SNP;
    }
    if a.first() == Some(&b'<') {
        if alt.starts_with("<X>") || alt.starts_with("<*>") || alt == "<NON_REF>" {
            return VariantType::REF;
        }
        return VariantType::OTHER;
    }
    if a.contains(&b'[') || a.contains(&b']') {
        return VariantType::BND;
    }

    let prefix = r
        .iter()
        .zip(a)
        .take_while(|(x, y)| x.eq_ignore_ascii_case(y))
        .count();
    let r = &r[prefix..];
    let a = &a[prefix..];
    match (r.is_empty(), a.is_empty()) {
        (true, true) => return VariantType::REF,
        (true, false) | (false, true) => return VariantType::INDEL,
        (false, false) => {}
    }

    // Trim the shared suffix, keeping at least one base on each side
    let (mut re, mut ae) = (r.len() - 1, a.len() - 1);
    while re > 0 && ae > 0 && r[re].eq_ignore_ascii_case(&a[ae]) {
        re -= 1;
        ae -= 1;
    }
    let same_end = r[re].eq_ignore_ascii_case(&a[ae]);
    if ae == 0 {
        if re == 0 {
            return VariantType::SNP;
        }
        return if same_end {
            VariantType::INDEL
        } else {
            VariantType::OTHER
        };
    }
    if re == 0 {
        return if same_end {
            VariantType::INDEL
        } else {
            VariantType::OTHER
        };
    }
    if re == ae {
        VariantType::MNP
    } else {
        VariantType::OTHER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(alleles: &[&str]) -> u8 {
        VariantType::from_alleles(alleles).code()
    }

    #[test]
    fn single_base_changes() {
        assert_eq!(classify(&["A", "G"]), 1);
        assert_eq!(classify(&["A", "."]), 0);
        assert_eq!(classify(&["A", "A"]), 0);
        assert_eq!(classify(&["A", "X"]), 0);
        assert_eq!(classify(&["A", "*"]), 32);
    }

    #[test]
    fn no_alt_is_ref() {
        assert_eq!(classify(&["A"]), 0);
        assert_eq!(classify(&[]), 0);
    }

    #[test]
    fn indels() {
        assert_eq!(classify(&["A", "AT"]), 4);
        assert_eq!(classify(&["ATG", "A"]), 4);
        assert_eq!(classify(&["CATG", "CTG"]), 4);
        assert_eq!(classify(&["acgt", "ACG"]), 4);
    }

    #[test]
    fn multi_base_substitutions() {
        assert_eq!(classify(&["AC", "GT"]), 2);
        assert_eq!(classify(&["ACGT", "ATGT"]), 1);
        assert_eq!(classify(&["ACGT", "TT"]), 8);
    }

    #[test]
    fn symbolic_and_breakends() {
        assert_eq!(classify(&["A", "<DEL>"]), 8);
        assert_eq!(classify(&["A", "<*>"]), 0);
        assert_eq!(classify(&["A", "<NON_REF>"]), 0);
        assert_eq!(classify(&["G", "G]17:198982]"]), 16);
    }

    #[test]
    fn types_are_combined_over_alts() {
        let t = VariantType::from_alleles(&["A", "G", "AT"]);
        assert_eq!(t, VariantType::SNP | VariantType::INDEL);
        assert_eq!(t.to_string(), "5");
    }
}
