//! Error types for annotation file operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum VocError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML serialization error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Document is not parseable as an annotation file
    #[error("malformed annotation document: {message}")]
    Malformed {
        /// Offending file, when the document came from disk
        path: Option<PathBuf>,
        /// Description of the parse failure
        message: String,
    },

    /// File extension is not the recognized annotation extension
    #[error("unsupported annotation extension: {path:?}")]
    UnsupportedExtension {
        /// Path with the rejected extension
        path: PathBuf,
    },
}

impl VocError {
    /// Create a malformed document error with a message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            path: None,
            message: message.into(),
        }
    }

    /// Attach the source path to a malformed document error.
    pub(crate) fn at_path(self, path: &Path) -> Self {
        match self {
            Self::Malformed { message, .. } => Self::Malformed {
                path: Some(path.to_path_buf()),
                message,
            },
            other => other,
        }
    }
}
