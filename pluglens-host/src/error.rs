//! Loader error types
//!
//! Every variant maps to one of the three reported [`ErrorKind`]s.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and inspecting a plugin module
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The dynamic linker rejected the path; `message` is its diagnostic
    #[error("Failed to load module '{}': {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("Symbol not found: {symbol} ({message})")]
    SymbolNotFound {
        symbol: &'static str,
        message: String,
    },

    #[error("ABI version mismatch: expected {expected}, got {actual}")]
    AbiVersionMismatch { expected: u32, actual: u32 },

    #[error("Module already closed: {}", path.display())]
    ModuleClosed { path: PathBuf },

    #[error("Module '{}' exposes no root object", path.display())]
    NullRoot { path: PathBuf },

    #[error("Root object exposes neither structural metadata nor a class name")]
    NoMetadata,

    #[error("Metadata decoding failed: {0}")]
    MetadataDecode(#[source] rmp_serde::decode::Error),
}

/// Reported error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    #[serde(rename = "LoadError")]
    Load,
    #[serde(rename = "NullRootError")]
    NullRoot,
    #[serde(rename = "NoMetadataError")]
    NoMetadata,
}

impl LoaderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. }
            | Self::SymbolNotFound { .. }
            | Self::AbiVersionMismatch { .. }
            | Self::ModuleClosed { .. } => ErrorKind::Load,
            Self::NullRoot { .. } => ErrorKind::NullRoot,
            Self::NoMetadata | Self::MetadataDecode(_) => ErrorKind::NoMetadata,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Load => "LoadError",
            ErrorKind::NullRoot => "NullRootError",
            ErrorKind::NoMetadata => "NoMetadataError",
        })
    }
}
