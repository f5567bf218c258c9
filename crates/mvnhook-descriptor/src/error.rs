//! Error types for the descriptor model
//!
//! Provides error handling for:
//! - Parse operations (text → Document)
//! - Apply operations (structural mutation)
//! - Serialize operations (Document → file)

use std::path::PathBuf;

/// Errors while reading a descriptor (ingress)
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Markup is not well formed
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// Markup is well formed but has no usable document shape
    #[error("invalid document structure: {0}")]
    Structure(String),

    /// Bytes could not be decoded as text
    #[error("encoding error: {0}")]
    Encoding(String),

    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Create syntax error at a byte offset
    pub fn syntax_error(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors during structural mutation
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// Fragment handed to an insertion is not a plugin node with an identity
    #[error("fragment is not a plugin with groupId/artifactId: <{0}>")]
    InvalidFragment(String),

    /// An element expected after insertion could not be located
    #[error("element <{0}> missing after insertion")]
    MissingElement(String),
}

/// Errors during serialization (egress)
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// Writer rejected an event
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Serialized bytes were not valid UTF-8
    #[error("serialized output is not valid utf-8")]
    InvalidUtf8,

    /// IO error during file write
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SerializeError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
