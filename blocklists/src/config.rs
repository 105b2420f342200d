//! Configuration types for block-list conversion.
//!
//! Split into run config (where to read and write) and converter config
//! (how rules are converted), so the converter never sees filesystem concerns.

use std::path::PathBuf;

/// Base URL the converted lists are published under.
pub const DEFAULT_CONVERTED_BASE_URL: &str = "https://blocklists.den.io/";

/// Safari refuses content-blocker lists with more rules than this.
pub const DEFAULT_RULES_LIMIT: usize = 50_000;

/// File name of the manifest written into the output directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Run options for a conversion batch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ConvertConfig {
    /// JSON document listing the block-list sources.
    pub input_file: PathBuf,
    /// Existing directory that receives `<id>.json` files and the manifest.
    pub output_dir: PathBuf,
    /// Base URL recorded as `convertedURL` prefix in the manifest.
    pub converted_base_url: String,
    /// Maximum number of bytes read from a single source (default: 64 MiB).
    /// Larger sources fail the entry instead of exhausting memory.
    pub max_source_size: u64,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::new(),
            output_dir: PathBuf::new(),
            converted_base_url: DEFAULT_CONVERTED_BASE_URL.to_owned(),
            max_source_size: 67_108_864,
        }
    }
}

impl ConvertConfig {
    /// Public URL of a converted list.
    #[must_use]
    pub fn converted_url(&self, file_name: &str) -> String {
        if self.converted_base_url.ends_with('/') {
            format!("{}{file_name}", self.converted_base_url)
        } else {
            format!("{}/{file_name}", self.converted_base_url)
        }
    }
}

/// Options for the Safari rule converter.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ConverterConfig {
    /// Maximum number of rules emitted per list.
    pub rules_limit: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            rules_limit: DEFAULT_RULES_LIMIT,
        }
    }
}
