//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sitaware operations
pub type Result<T> = std::result::Result<T, Error>;

/// Rejected or unparseable date windows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// A date string none of the accepted formats could read
    #[error("unrecognised date ({0})")]
    Unparseable(String),

    #[error("begindate ({begin}) cannot be after enddate ({end})")]
    BeginAfterEnd { begin: String, end: String },

    #[error("enddate ({end}) cannot be before lastdate ({last})")]
    EndBeforeLast { end: String, last: String },

    #[error("begindate ({begin}) cannot be after today ({today})")]
    BeginInFuture { begin: String, today: String },
}

/// Main error type for sitaware
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid date window
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Malformed nested record or index
    #[error("Format error: {0}")]
    Format(String),

    /// Feed is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid tag pattern
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Output or input file could not be opened or written
    #[error("Resource error at {}: {source}", .path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Resource { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::format("missing id");
        assert_eq!(err.to_string(), "Format error: missing id");
    }

    #[test]
    fn test_date_error_wraps() {
        let err: Error = DateError::BeginAfterEnd {
            begin: "2023-02-01".to_string(),
            end: "2023-01-01".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Date error: begindate (2023-02-01) cannot be after enddate (2023-01-01)"
        );
    }

    #[test]
    fn test_resource_error_mentions_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory");
        let err = Error::resource("/nowhere/attribute_table.html", io);
        assert!(err.to_string().contains("/nowhere/attribute_table.html"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
