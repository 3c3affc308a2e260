use thiserror::Error;

/// Fatal errors that abort parsing of the current file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to read {source_name} after line {line}: {source}")]
    Read {
        source_name: String,
        line: usize,
        source: std::io::Error,
    },
    #[error(
        "{source_name}:{line}: putback of {requested} line(s) exceeds {available} retained line(s)"
    )]
    PutbackOutOfRange {
        source_name: String,
        line: usize,
        requested: usize,
        available: usize,
    },
}
