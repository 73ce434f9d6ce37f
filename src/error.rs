use thiserror::Error;

#[derive(Debug, Error)]
pub enum CustomError {
    #[error("could not read {path}")]
    ReadWithPath {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not read input")]
    ReadWithoutPath {
        #[source]
        source: std::io::Error,
    },

    #[error("could not write to {path}")]
    Write {
        #[source]
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[error("could not read {path}")]
    CsvRead {
        #[source]
        source: csv::Error,
        path: std::path::PathBuf,
    },

    #[error("could not write summary")]
    CsvWrite(#[from] csv::Error),

    #[error("could not flush summary output")]
    Flush {
        #[source]
        source: std::io::Error,
    },

    #[error("could not build thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid progress bar template")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error("input is empty")]
    InputEmpty,

    #[error("could not parse VCF header")]
    VcfHeader {
        #[source]
        source: std::io::Error,
    },

    #[error("could not read record {record_num}")]
    VcfRecord {
        #[source]
        source: std::io::Error,
        record_num: u64,
    },

    #[error("sample {sample} not found in VCF header")]
    UnknownSample { sample: String },

    #[error("sample {sample} requested more than once")]
    DuplicateSample { sample: String },

    #[error("no samples requested")]
    SamplesEmpty,
}

pub type Result<T> = std::result::Result<T, CustomError>;
