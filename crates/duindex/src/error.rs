/// Errors produced while parsing a single report line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("expected 3 tab-separated fields, found {found}: {line:?}")]
    InvalidFieldCount { found: usize, line: String },

    #[error("invalid size {value:?}: {reason}")]
    InvalidSize { value: String, reason: String },

    #[error("invalid modified time {value:?}: {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("empty path")]
    EmptyPath,

    #[error("path is not valid UTF-8 after byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize },

    #[error("path {path:?} is outside the report root {root:?}")]
    ForeignRoot { path: String, root: String },
}

impl LineError {
    /// Returns true for errors about the path structure rather than field syntax.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::EmptyPath | Self::ForeignRoot { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line_no}: {source}")]
    Line {
        line_no: usize,
        #[source]
        source: LineError,
    },

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
