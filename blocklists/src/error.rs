//! Error types for block-list conversion.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// A fatal error that aborts the whole run.
///
/// Everything that can go wrong for a single block list is reported as an
/// [`EntryError`] instead and never surfaces here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The output directory is missing or is not a directory.
    #[error("Output directory does not exist: {}", .0.display())]
    OutputDirectoryDoesNotExist(PathBuf),

    /// The input file is missing, unreadable, malformed, or fails validation.
    #[error("Failed to load input file {}: {reason}", .path.display())]
    FailedToLoadInputFile {
        /// The input file path.
        path: PathBuf,
        /// Human-readable description of the failure.
        reason: String,
    },

    /// The manifest could not be serialized.
    #[error("Failed to encode manifest: {0}")]
    FailedToEncodeManifest(#[source] serde_json::Error),

    /// The manifest could not be written to disk.
    #[error("Failed to write manifest {}: {source}", .path.display())]
    FailedToWriteManifest {
        /// The manifest file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadInputFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// The kind of failure that kept a single block list from being converted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryErrorKind {
    /// The source could not be downloaded or read.
    FetchFailed,
    /// The source exceeded the configured maximum size.
    SourceTooLarge,
    /// The source URL uses a scheme the fetcher cannot handle.
    UnsupportedScheme,
    /// The converter produced no output for the fetched rules.
    ConversionFailed,
    /// The converted rule list could not be written to the output directory.
    WriteFailed,
}

/// A per-entry failure, recorded in the report while the batch continues.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct EntryError {
    /// Identifier of the block list that failed.
    pub id: String,
    /// The kind of failure.
    pub kind: EntryErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl EntryError {
    pub(crate) fn new(
        id: impl Into<String>,
        kind: EntryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            message: message.into(),
        }
    }

    /// Format the error for human-readable output.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        let stage = match self.kind {
            EntryErrorKind::FetchFailed
            | EntryErrorKind::SourceTooLarge
            | EntryErrorKind::UnsupportedScheme => "fetch",
            EntryErrorKind::ConversionFailed => "convert",
            EntryErrorKind::WriteFailed => "write",
        };
        format!("{}: [{stage} error] {}", self.id, self.message)
    }
}
