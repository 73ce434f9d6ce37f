use std::collections::HashSet;

use crate::error::{CustomError, Result};

/// Returns the subset of samples to keep, in header order, along with their
/// column indices so the reader only decodes the relevant genotypes.
pub fn select_samples(
    samples: Vec<String>,
    filter: Option<Vec<String>>,
) -> Result<(Vec<String>, Option<Vec<usize>>)> {
    let Some(requested) = filter else {
        return Ok((samples, None));
    };
    if requested.is_empty() {
        return Err(CustomError::SamplesEmpty);
    }

    let mut keep = HashSet::with_capacity(requested.len());
    for sample in &requested {
        if !keep.insert(sample.as_str()) {
            return Err(CustomError::DuplicateSample {
                sample: sample.clone(),
            });
        }
    }

    let mut filtered_samples = Vec::with_capacity(keep.len());
    let mut indices = Vec::with_capacity(keep.len());
    for (idx, sample_id) in samples.into_iter().enumerate() {
        if keep.remove(sample_id.as_str()) {
            indices.push(idx);
            filtered_samples.push(sample_id);
        }
    }

    // Report the first unknown name in the order it was requested
    if let Some(missing) = requested.iter().find(|s| keep.contains(s.as_str())) {
        return Err(CustomError::UnknownSample {
            sample: missing.clone(),
        });
    }

    Ok((filtered_samples, Some(indices)))
}
