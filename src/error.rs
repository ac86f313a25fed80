//! Error types for SEG-Y decoding and encoding.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::SampleKind;

#[derive(Debug, Error)]
pub enum SegyError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{block} must be exactly {expected} bytes, got {actual}")]
    BlockSize {
        block: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("unknown sample format code: {0}")]
    UnknownSampleFormat(i64),

    #[error("shape mismatch: expected {expected:?} (traces, samples), got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("sample type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: SampleKind,
        actual: SampleKind,
    },

    #[error("data section of {data_bytes} bytes is not a whole number of {record_size}-byte trace records")]
    TruncatedFile { data_bytes: u64, record_size: u64 },

    #[error("value {value} cannot be represented as an IBM float")]
    IbmRange { value: f64 },

    #[error("IBM float out of range in traces {traces:?}")]
    IbmRangeTraces { traces: Vec<usize> },

    #[error("character {ch:?} in {context} is not representable in EBCDIC (cp500)")]
    Encoding { ch: char, context: &'static str },

    #[error("unknown header field: {0}")]
    UnknownField(String),

    #[error("value {value} does not fit header field {field}")]
    FieldOverflow { field: &'static str, value: i64 },

    #[error("textual header line {0} is out of range 1..=40")]
    InvalidLine(usize),

    #[error("{len} values cannot form a {traces} x {samples} matrix")]
    InvalidShape {
        traces: usize,
        samples: usize,
        len: usize,
    },

    #[error("inconsistent file layout: {0}")]
    Layout(String),

    #[error("bad CSV at line {line}: {reason}")]
    InvalidCsv { line: usize, reason: String },
}

impl SegyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SegyError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn block(block: &'static str, expected: usize, actual: usize) -> Self {
        SegyError::BlockSize {
            block,
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, SegyError>;
