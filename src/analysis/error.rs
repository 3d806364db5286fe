use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SsrError {
    #[error("Unrecognized nucleotide code '{code}' at position {position} of primer {primer}")]
    UnknownNucleotideCode {
        primer: String,
        code: char,
        position: usize,
    },

    #[error("Locus {start}-{end} ({motif}) is not placed on a chromosome")]
    UnplacedLocus {
        start: usize,
        end: usize,
        motif: String,
    },

    #[error("Can't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed marker table at line {line}: {reason}")]
    MarkerTable { line: usize, reason: String },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Can't build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Write(#[from] std::io::Error),
}

impl SsrError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SsrError>;
