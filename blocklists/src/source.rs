//! Input loader: the JSON document that lists block-list sources.
//!
//! Two layouts are accepted:
//! - a flat array of block lists;
//! - an array of collections, each carrying its own `blocklists` array.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::MANIFEST_FILE_NAME;
use crate::error::Error;

/// A single block-list source.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Blocklist {
    /// Identifier, also used as the output file stem.
    #[serde(alias = "slug")]
    pub id: String,
    pub name: String,
    pub description: String,
    /// Where the filter rules are downloaded from.
    #[serde(rename = "sourceURL")]
    pub source_url: Url,
    /// Home page of the list maintainers.
    #[serde(rename = "supportURL", alias = "website", default)]
    pub support_url: Option<Url>,
}

impl Blocklist {
    /// Create a block list without a support URL.
    #[must_use]
    pub fn new(id: &str, name: &str, description: &str, source_url: Url) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            source_url,
            support_url: None,
        }
    }

    /// Name of the converted file inside the output directory.
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

/// A named group of block lists.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: String,
    pub blocklists: Vec<Blocklist>,
}

/// The parsed input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sources {
    Blocklists(Vec<Blocklist>),
    Collections(Vec<Collection>),
}

impl Sources {
    /// All block lists in input order, flattening collections.
    pub fn blocklists(&self) -> Box<dyn Iterator<Item = &Blocklist> + '_> {
        match self {
            Self::Blocklists(lists) => Box::new(lists.iter()),
            Self::Collections(collections) => {
                Box::new(collections.iter().flat_map(|c| c.blocklists.iter()))
            }
        }
    }

    /// Total number of block lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocklists().count()
    }

    /// Whether the document lists no block lists at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read and validate the input document.
///
/// # Errors
///
/// Returns [`Error::FailedToLoadInputFile`] if the file cannot be read, is not
/// valid JSON, does not match either layout, or contains unsafe or duplicate ids.
pub fn load_sources(path: &Path) -> Result<Sources, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::load(path, e.to_string()))?;
    let sources = parse_sources(&content).map_err(|reason| Error::load(path, reason))?;
    validate_ids(&sources).map_err(|reason| Error::load(path, reason))?;
    Ok(sources)
}

/// Parse the input document, choosing the layout from the first element.
///
/// Deserializing into the concrete layout (rather than an untagged enum) keeps
/// serde's error message pointing at the offending field.
fn parse_sources(content: &str) -> Result<Sources, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let Value::Array(items) = &value else {
        return Err("expected a JSON array of block lists or collections".to_owned());
    };

    let is_collections = items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|obj| obj.contains_key("blocklists"));

    if is_collections {
        serde_json::from_value(value)
            .map(Sources::Collections)
            .map_err(|e| format!("invalid collection: {e}"))
    } else {
        serde_json::from_value(value)
            .map(Sources::Blocklists)
            .map_err(|e| format!("invalid block list: {e}"))
    }
}

/// An id becomes `<output-dir>/<id>.json`, so it must be a plain file stem.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn validate_ids(sources: &Sources) -> Result<(), String> {
    // Keyed case-insensitively: `EasyList` and `easylist` share a file on
    // case-insensitive filesystems.
    let mut seen: HashMap<String, (&str, usize)> = HashMap::new();

    for (index, blocklist) in sources.blocklists().enumerate() {
        if !is_safe_id(&blocklist.id) {
            return Err(format!(
                "block list #{} has an invalid id '{}': use ASCII letters, digits, '-', '_' or '.'",
                index + 1,
                blocklist.id
            ));
        }
        if blocklist
            .output_file_name()
            .eq_ignore_ascii_case(MANIFEST_FILE_NAME)
        {
            return Err(format!(
                "block list #{} has the reserved id '{}': its output would replace {MANIFEST_FILE_NAME}",
                index + 1,
                blocklist.id
            ));
        }
        if let Some((first_id, first)) = seen.insert(
            blocklist.id.to_ascii_lowercase(),
            (blocklist.id.as_str(), index),
        ) {
            return Err(format!(
                "duplicate block list id '{}' (entries #{} '{first_id}' and #{})",
                blocklist.id,
                first + 1,
                index + 1
            ));
        }
    }

    Ok(())
}
