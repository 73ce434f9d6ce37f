use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::{CustomError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const BCF_MAGIC: &[u8] = b"BCF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Vcf,
    Bcf,
}

/// Open `path` (or stdin for `-`), peel off a gzip/BGZF layer if present and
/// tell VCF text from BCF by the decompressed magic.
pub fn open_input(path: &Path) -> Result<(InputFormat, Box<dyn BufRead + Send>)> {
    let reader: Box<dyn BufRead + Send> = if path.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let f = File::open(path).map_err(|e| CustomError::ReadWithPath {
            source: e,
            path: path.to_path_buf(),
        })?;
        Box::new(BufReader::new(f))
    };
    detect_format(reader).map_err(|e| match e {
        CustomError::ReadWithoutPath { source } => CustomError::ReadWithPath {
            source,
            path: path.to_path_buf(),
        },
        other => other,
    })
}

pub fn detect_format(
    mut reader: Box<dyn BufRead + Send>,
) -> Result<(InputFormat, Box<dyn BufRead + Send>)> {
    let is_gzip = peek(&mut reader)?.starts_with(&GZIP_MAGIC);
    if is_gzip {
        tracing::debug!("detected gzip/BGZF input");
        // MultiGzDecoder handles BGZF and concatenated members
        reader = Box::new(BufReader::new(MultiGzDecoder::new(reader)));
    }

    let head = peek(&mut reader)?;
    if head.is_empty() {
        return Err(CustomError::InputEmpty);
    }
    let format = if head.starts_with(BCF_MAGIC) {
        InputFormat::Bcf
    } else {
        InputFormat::Vcf
    };
    tracing::debug!(?format, "detected input format");
    Ok((format, reader))
}

fn peek(reader: &mut Box<dyn BufRead + Send>) -> Result<&[u8]> {
    reader
        .fill_buf()
        .map_err(|e| CustomError::ReadWithoutPath { source: e })
}
