//! Manifest records and the sorted-key manifest writer.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::config::MANIFEST_FILE_NAME;
use crate::error::Error;
use crate::source::{Blocklist, Collection};

/// Outcome of converting one block list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct BlocklistResult {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "sourceURL")]
    pub source_url: Url,
    #[serde(rename = "supportURL", skip_serializing_if = "Option::is_none")]
    pub support_url: Option<Url>,
    /// Public URL of the converted list; only set once the file is written.
    #[serde(rename = "convertedURL", skip_serializing_if = "Option::is_none")]
    pub converted_url: Option<String>,
    pub fetch_succeeded: bool,
    pub conversion_succeeded: bool,
    pub converted_count: usize,
    pub errors_count: usize,
    pub over_limit: bool,
}

impl BlocklistResult {
    /// A record for `blocklist` with both outcome flags false and zero counts.
    #[must_use]
    pub fn pending(blocklist: &Blocklist) -> Self {
        Self {
            id: blocklist.id.clone(),
            name: blocklist.name.clone(),
            description: blocklist.description.clone(),
            source_url: blocklist.source_url.clone(),
            support_url: blocklist.support_url.clone(),
            converted_url: None,
            fetch_succeeded: false,
            conversion_succeeded: false,
            converted_count: 0,
            errors_count: 0,
            over_limit: false,
        }
    }

    /// Whether the list was fetched, converted, and written.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.fetch_succeeded && self.conversion_succeeded
    }
}

/// A collection and the results of its block lists, in input order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct CollectionResult {
    pub id: String,
    pub name: String,
    pub description: String,
    pub blocklists: Vec<BlocklistResult>,
}

impl CollectionResult {
    #[must_use]
    pub fn new(collection: &Collection, blocklists: Vec<BlocklistResult>) -> Self {
        Self {
            id: collection.id.clone(),
            name: collection.name.clone(),
            description: collection.description.clone(),
            blocklists,
        }
    }
}

/// The aggregate output document; mirrors the layout of the input.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Manifest {
    Blocklists(Vec<BlocklistResult>),
    Collections(Vec<CollectionResult>),
}

impl Manifest {
    /// All block-list results in manifest order.
    pub fn results(&self) -> Box<dyn Iterator<Item = &BlocklistResult> + '_> {
        match self {
            Self::Blocklists(results) => Box::new(results.iter()),
            Self::Collections(collections) => {
                Box::new(collections.iter().flat_map(|c| c.blocklists.iter()))
            }
        }
    }

    /// Encode as pretty-printed JSON with object keys in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FailedToEncodeManifest`] if serialization fails.
    pub fn to_sorted_json(&self) -> Result<String, Error> {
        let value = serde_json::to_value(self).map_err(Error::FailedToEncodeManifest)?;
        serde_json::to_string_pretty(&sort_keys(value)).map_err(Error::FailedToEncodeManifest)
    }
}

/// Rebuild every object with its keys inserted in sorted order, so the output
/// is sorted whether or not `serde_json` preserves insertion order.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Write `manifest.json` into `output_dir`.
///
/// # Errors
///
/// Returns [`Error::FailedToEncodeManifest`] or [`Error::FailedToWriteManifest`].
pub fn write_manifest(manifest: &Manifest, output_dir: &Path) -> Result<PathBuf, Error> {
    let json = manifest.to_sorted_json()?;
    let path = output_dir.join(MANIFEST_FILE_NAME);
    std::fs::write(&path, json).map_err(|source| Error::FailedToWriteManifest {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
