//! # den-blocklists
//!
//! Fetches ad and tracker block lists, converts them from filter-rule syntax
//! into Safari content-blocker JSON, and writes a manifest describing the
//! outcome for every list.
//!
//! Conversion is done by the `adblock` crate; this crate is the batch driver
//! around it. Per-list failures never abort a run: they are recorded in the
//! manifest (false outcome flags, zero counts) and in
//! [`ConversionReport::entry_errors`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use den_blocklists::{ConvertConfig, HttpFetcher, SafariConverter, run};
//!
//! let mut config = ConvertConfig::default();
//! config.input_file = PathBuf::from("blocklists.json");
//! config.output_dir = PathBuf::from("public");
//!
//! let fetcher = HttpFetcher::new().unwrap();
//! let converter = SafariConverter::default();
//! let report = run(&config, &fetcher, &converter).unwrap();
//! println!("Manifest: {}", report.manifest_path.display());
//! println!("Converted: {}/{}", report.succeeded(), report.total());
//! ```

mod config;
mod convert;
mod error;
mod fetch;
mod manifest;
pub mod output;
pub mod pipeline;
mod report;
mod source;

pub use config::{
    ConvertConfig, ConverterConfig, DEFAULT_CONVERTED_BASE_URL, DEFAULT_RULES_LIMIT,
    MANIFEST_FILE_NAME,
};
pub use convert::{ConversionResult, ConvertError, RuleConverter, SafariConverter};
pub use error::{EntryError, EntryErrorKind, Error};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use manifest::{BlocklistResult, CollectionResult, Manifest, write_manifest};
pub use report::ConversionReport;
pub use source::{Blocklist, Collection, Sources, load_sources};

use tracing::info;

/// Convert every block list named in `config.input_file` and write the manifest.
///
/// This is the primary public API.
///
/// # Errors
///
/// Returns an error if the output directory does not exist, if the input file
/// cannot be loaded, or if the manifest cannot be encoded or written. Nothing
/// is written when the first two checks fail. Per-list failures are never
/// returned here; they are recorded in the report and the manifest.
pub fn run(
    config: &ConvertConfig,
    fetcher: &dyn Fetcher,
    converter: &dyn RuleConverter,
) -> Result<ConversionReport, Error> {
    if !config.output_dir.is_dir() {
        return Err(Error::OutputDirectoryDoesNotExist(config.output_dir.clone()));
    }

    let sources = load_sources(&config.input_file)?;
    info!(
        "Loaded {} block lists from {}",
        sources.len(),
        config.input_file.display()
    );

    let (manifest, entry_errors) = pipeline::convert_sources(&sources, config, fetcher, converter);
    let manifest_path = write_manifest(&manifest, &config.output_dir)?;

    Ok(ConversionReport {
        manifest_path,
        manifest,
        entry_errors,
    })
}
