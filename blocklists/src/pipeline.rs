//! Per-entry conversion: fetch, convert, write, record.
//!
//! Every failure here is isolated to its entry. The caller always gets one
//! [`BlocklistResult`] per input block list, in input order.

use std::path::Path;

use tracing::{info, warn};

use crate::config::ConvertConfig;
use crate::convert::RuleConverter;
use crate::error::{EntryError, EntryErrorKind};
use crate::fetch::Fetcher;
use crate::manifest::{BlocklistResult, CollectionResult, Manifest};
use crate::source::{Blocklist, Sources};

/// Result record for one block list plus the failure, if any.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct EntryOutcome {
    pub result: BlocklistResult,
    pub error: Option<EntryError>,
}

impl EntryOutcome {
    fn failed(result: BlocklistResult, kind: EntryErrorKind, message: String) -> Self {
        warn!(id = %result.id, ?kind, "{message}");
        let error = EntryError::new(result.id.clone(), kind, message);
        Self {
            result,
            error: Some(error),
        }
    }
}

/// Split fetched text into rule lines, dropping empty lines.
fn split_rule_lines(text: &str) -> Vec<String> {
    text.trim_start_matches('\u{feff}')
        .split(['\n', '\r'])
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Write through a sibling temp file so readers never see a partial list.
fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    std::fs::write(tmp_path, contents)?;
    std::fs::rename(tmp_path, path).inspect_err(|_| {
        let _ = std::fs::remove_file(tmp_path);
    })
}

/// Fetch, convert, and write a single block list.
#[must_use]
pub fn convert_blocklist(
    blocklist: &Blocklist,
    config: &ConvertConfig,
    fetcher: &dyn Fetcher,
    converter: &dyn RuleConverter,
) -> EntryOutcome {
    let mut result = BlocklistResult::pending(blocklist);
    info!(id = %blocklist.id, "Converting {}", blocklist.source_url);

    let bytes = match fetcher.fetch(&blocklist.source_url, config.max_source_size) {
        Ok(bytes) => bytes,
        Err(e) => return EntryOutcome::failed(result, e.kind(), e.to_string()),
    };
    result.fetch_succeeded = true;

    let text = String::from_utf8_lossy(&bytes);
    let lines = split_rule_lines(&text);

    let conversion = match converter.convert(&lines) {
        Ok(conversion) => conversion,
        Err(e) => {
            return EntryOutcome::failed(result, EntryErrorKind::ConversionFailed, e.to_string());
        }
    };

    let file_name = blocklist.output_file_name();
    let output_path = config.output_dir.join(&file_name);
    if let Err(e) = write_atomic(&output_path, &conversion.converted) {
        return EntryOutcome::failed(
            result,
            EntryErrorKind::WriteFailed,
            format!("Failed to write {}: {e}", output_path.display()),
        );
    }

    result.conversion_succeeded = true;
    result.converted_count = conversion.converted_count;
    result.errors_count = conversion.errors_count;
    result.over_limit = conversion.over_limit;
    result.converted_url = Some(config.converted_url(&file_name));

    info!(
        id = %blocklist.id,
        lines = lines.len(),
        converted = result.converted_count,
        errors = result.errors_count,
        over_limit = result.over_limit,
        "Wrote {}",
        output_path.display()
    );

    EntryOutcome {
        result,
        error: None,
    }
}

/// Convert every block list in `sources`, collecting results in input order.
#[must_use]
pub fn convert_sources(
    sources: &Sources,
    config: &ConvertConfig,
    fetcher: &dyn Fetcher,
    converter: &dyn RuleConverter,
) -> (Manifest, Vec<EntryError>) {
    let mut entry_errors = Vec::new();
    let mut convert_all = |blocklists: &[Blocklist]| -> Vec<BlocklistResult> {
        blocklists
            .iter()
            .map(|blocklist| {
                let outcome = convert_blocklist(blocklist, config, fetcher, converter);
                entry_errors.extend(outcome.error);
                outcome.result
            })
            .collect()
    };

    let manifest = match sources {
        Sources::Blocklists(blocklists) => Manifest::Blocklists(convert_all(blocklists.as_slice())),
        Sources::Collections(collections) => Manifest::Collections(
            collections
                .iter()
                .map(|collection| {
                    CollectionResult::new(collection, convert_all(collection.blocklists.as_slice()))
                })
                .collect(),
        ),
    };

    (manifest, entry_errors)
}
