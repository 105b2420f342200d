//! Conversion report types.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::EntryError;
use crate::manifest::Manifest;

/// Result of a conversion run whose manifest was written.
///
/// A written manifest does not mean every list converted: check `ok()` or
/// `entry_errors` before publishing.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct ConversionReport {
    /// Where `manifest.json` was written.
    pub manifest_path: PathBuf,
    /// The manifest as written.
    pub manifest: Manifest,
    /// Per-entry failures, in input order.
    pub entry_errors: Vec<EntryError>,
}

impl ConversionReport {
    /// Number of block lists processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.manifest.results().count()
    }

    /// Number of block lists fetched, converted, and written.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.manifest.results().filter(|r| r.succeeded()).count()
    }

    /// Number of block lists that failed at any stage.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Number of block lists truncated by the rule limit.
    #[must_use]
    pub fn over_limit(&self) -> usize {
        self.manifest.results().filter(|r| r.over_limit).count()
    }

    /// Total converted rules across all lists.
    #[must_use]
    pub fn converted_rules(&self) -> usize {
        self.manifest.results().map(|r| r.converted_count).sum()
    }

    /// Whether every block list converted.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.entry_errors.is_empty()
    }
}
