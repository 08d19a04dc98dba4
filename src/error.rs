//! Error taxonomy for ingestion runs.

use thiserror::Error;

/// Result alias for library operations that fail with [`IngestError`].
pub type IngestResult<T> = std::result::Result<T, IngestError>;

/// Everything that can go wrong in a run.
///
/// `MalformedInput` and `InvalidConfig` are returned before any outcome is produced. The two
/// row/stream variants travel on the result stream as [`Outcome::Error`](crate::Outcome::Error).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RowCardinalityMismatch {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("read failed after line {line}: {message}")]
    UpstreamReadFailure { line: u64, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Fieldless view of [`IngestError`] for matching without caring about payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedInput,
    RowCardinalityMismatch,
    UpstreamReadFailure,
    InvalidConfig,
    ThreadPanicked,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::MalformedInput(_) => ErrorKind::MalformedInput,
            IngestError::RowCardinalityMismatch { .. } => ErrorKind::RowCardinalityMismatch,
            IngestError::UpstreamReadFailure { .. } => ErrorKind::UpstreamReadFailure,
            IngestError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            IngestError::ThreadPanicked(_) => ErrorKind::ThreadPanicked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let e = IngestError::RowCardinalityMismatch {
            line: 3,
            expected: 2,
            found: 1,
        };
        assert_eq!(e.kind(), ErrorKind::RowCardinalityMismatch);
        assert_eq!(e.to_string(), "line 3: expected 2 fields, found 1");
    }

    #[test]
    fn test_read_failure_names_last_good_line() {
        let e = IngestError::UpstreamReadFailure {
            line: 4,
            message: "peer reset".into(),
        };
        assert_eq!(e.kind(), ErrorKind::UpstreamReadFailure);
        assert_eq!(e.to_string(), "read failed after line 4: peer reset");
    }
}
