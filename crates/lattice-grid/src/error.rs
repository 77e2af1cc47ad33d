//! Error types for Lattice Grid.

use std::path::PathBuf;

use crate::actions::RowAction;
use crate::model::RowKey;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while configuring or driving a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Grid-level configuration error.
    #[error("Invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// Column-level configuration error.
    #[error("Invalid column {index}: {message}")]
    InvalidColumn { index: usize, message: String },

    /// A row action fired with no callback registered for it.
    #[error("No callback registered for row action '{0}'")]
    UnregisteredAction(RowAction),

    /// A row action name that is not one of add, edit, delete or custom.
    #[error("Unknown row action '{0}'")]
    UnknownAction(String),

    /// A row action that needs a record was dispatched without one.
    #[error("Row action '{0}' requires a row")]
    MissingRow(RowAction),

    /// No rendered row carries the given identity.
    #[error("No rendered row with identity {0}")]
    UnknownRow(RowKey),

    /// A value that should have been a JSON object (or array of objects).
    #[error("Expected a JSON object record, got {0}")]
    InvalidRecord(String),

    /// TOML configuration could not be parsed.
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON configuration could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file with an extension other than `.toml` or `.json`.
    #[error("Unsupported configuration format '{0}'")]
    UnsupportedFormat(PathBuf),
}

impl GridError {
    /// Create a grid-level configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create a column configuration error.
    pub fn column(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidColumn {
            index,
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors caused by configuration rather than input.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::InvalidColumn { .. }
                | Self::UnregisteredAction(_)
                | Self::UnknownAction(_)
                | Self::Toml(_)
                | Self::UnsupportedFormat(_)
        )
    }
}
