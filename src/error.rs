use thiserror::Error;

/// Failures that belong to the log format itself rather than to a storage backend.
///
/// These travel inside an [`eyre::Report`], use `downcast_ref::<LogError>()` to match on them.
#[derive(Debug, Error, PartialEq)]
pub enum LogError {
    #[error("log is empty, no columns to parse")]
    EmptyLog,

    #[error("log has no column named '{0}'")]
    MissingColumn(String),

    #[error("malformed literal {text:?}: {reason}")]
    MalformedLiteral { text: String, reason: String },

    #[error("line {line}: expected at most {expected} fields, saw {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("log target {0} does not exist")]
    TargetMissing(String),

    #[error("invalid log target uri '{0}', use 'azure://', 's3://' or 'file://'")]
    InvalidUri(String),

    #[error("no credentials configured for {0}")]
    MissingCredentials(&'static str),
}
