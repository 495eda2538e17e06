// ABOUTME: Error kinds surfaced by configuration, export and import operations
// ABOUTME: Every variant renders as a single human-readable console message

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Settings file exists but is not a valid settings object
    #[error("Failed to parse settings file {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The driver could not open (or cleanly close) a connection
    #[error("Connection error: {0}")]
    Connection(#[source] mysql_async::Error),

    #[error("Query failed ({context}): {source}")]
    Query {
        context: String,
        #[source]
        source: mysql_async::Error,
    },

    /// Import document is missing, empty or malformed
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Invalid table name '{0}': only letters, digits and underscores are allowed (max 64 characters)"
    )]
    InvalidTableName(String),

    #[error("Console I/O failed: {0}")]
    Prompt(#[source] std::io::Error),
}

impl CliError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn query(context: impl Into<String>, source: mysql_async::Error) -> Self {
        CliError::Query {
            context: context.into(),
            source,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filesystem_error_names_path() {
        let err = CliError::filesystem(
            "bkp/users.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("bkp/users.json"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn invalid_format_message() {
        let err = CliError::InvalidFormat("`data` is empty".to_string());
        assert_eq!(err.to_string(), "Invalid file format: `data` is empty");
    }
}
