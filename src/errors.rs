// Error types for the fuel dashboard

use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the source table. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("cannot read {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error(
        "sheet '{sheet}' not found in {} (available: {})",
        path.display(),
        available.join(", ")
    )]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

impl LoadError {
    pub(crate) fn unreadable(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
    }
}

/// The loaded table does not have the shape the dashboard needs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
