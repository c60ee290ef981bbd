//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// The input file could not be opened.
    #[error("cannot open input file {}: {source}", .path.display())]
    Open {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying failure.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The namespace directory holding the table is missing.
    #[error("directory `{0}` not found in input file")]
    DirectoryNotFound(String),

    /// The table is missing from its namespace directory.
    #[error(
        "table `{table}` not found in directory `{directory}` (contains: {})",
        list_members(.available)
    )]
    TableNotFound {
        /// Namespace directory that was searched.
        directory: String,
        /// Table that was requested.
        table: String,
        /// Members of the directory.
        available: Vec<String>,
    },

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] clusterplot_core::Error),
}

fn list_members(members: &[String]) -> String {
    if members.is_empty() {
        "nothing".to_string()
    } else {
        members.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_found_lists_members() {
        let err = Error::TableNotFound {
            directory: "ana".to_string(),
            table: "ClusterTree".to_string(),
            available: vec!["HitTree".to_string(), "TrackTree".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("ClusterTree"));
        assert!(message.contains("HitTree, TrackTree"));

        let err = Error::TableNotFound {
            directory: "ana".to_string(),
            table: "ClusterTree".to_string(),
            available: Vec::new(),
        };
        assert!(err.to_string().contains("nothing"));
    }
}
