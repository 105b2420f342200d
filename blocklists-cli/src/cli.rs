use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use den_blocklists::{
    ConversionReport, ConvertConfig, ConverterConfig, DEFAULT_CONVERTED_BASE_URL,
    DEFAULT_RULES_LIMIT, HttpFetcher, SafariConverter, output,
};
use tracing::info;
use url::Url;

use crate::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Convert filter-rule block lists into Safari content-blocker lists.
#[derive(Debug, Parser)]
#[command(name = "den-blocklists", version, about)]
pub struct Cli {
    /// JSON file listing the block-list sources
    pub input_file: PathBuf,

    /// Existing directory that receives the converted lists and manifest.json
    pub output_directory: PathBuf,

    /// Base URL the converted lists are published under
    #[arg(long, default_value = DEFAULT_CONVERTED_BASE_URL, value_parser = parse_base_url)]
    pub base_url: String,

    /// Maximum number of rules per converted list
    #[arg(long, default_value_t = DEFAULT_RULES_LIMIT)]
    pub rules_limit: usize,

    /// Maximum size in bytes of a single source list
    #[arg(long, default_value_t = ConvertConfig::default().max_source_size)]
    pub max_source_size: u64,

    /// Exit with status 1 if any list failed to fetch, convert, or write
    #[arg(long)]
    pub strict: bool,

    /// Report format printed to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// How a completed run should be reported to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The manifest was written but `--strict` was set and some lists failed.
    EntriesFailed,
}

fn parse_base_url(value: &str) -> Result<String, String> {
    Url::parse(value)
        .map(|_| value.to_owned())
        .map_err(|e| format!("invalid base URL: {e}"))
}

impl Cli {
    fn convert_config(&self) -> ConvertConfig {
        let mut config = ConvertConfig::default();
        config.input_file.clone_from(&self.input_file);
        config.output_dir.clone_from(&self.output_directory);
        config.converted_base_url.clone_from(&self.base_url);
        config.max_source_size = self.max_source_size;
        config
    }

    fn converter_config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::default();
        config.rules_limit = self.rules_limit;
        config
    }
}

/// `file://` URL of the manifest when it can be expressed as one.
fn manifest_location(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .and_then(|p| Url::from_file_path(p).ok())
        .map_or_else(|| path.display().to_string(), |url| url.to_string())
}

fn print_report(report: &ConversionReport, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => {
            output::write_human(report, &mut out)?;
            writeln!(
                out,
                "Finished processing blocklists! {}",
                manifest_location(&report.manifest_path)
            )?;
        }
        OutputFormat::Json => output::write_json(report, &mut out)?,
    }
    Ok(())
}

/// Parse arguments, run the conversion, and print the report.
///
/// # Errors
///
/// Returns an error on any fatal conversion error or if the report cannot be printed.
pub fn run() -> Result<Outcome> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    info!(
        "Converting block lists from {} into {}",
        cli.input_file.display(),
        cli.output_directory.display()
    );

    let fetcher = HttpFetcher::new().context("Failed to initialize HTTP client")?;
    let converter = SafariConverter::new(cli.converter_config());

    let report = den_blocklists::run(&cli.convert_config(), &fetcher, &converter)?;
    print_report(&report, cli.format)?;

    if cli.strict && !report.ok() {
        return Ok(Outcome::EntriesFailed);
    }
    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["den-blocklists", "lists.json", "public"]).unwrap();
        assert_eq!(cli.input_file, PathBuf::from("lists.json"));
        assert_eq!(cli.output_directory, PathBuf::from("public"));
        assert_eq!(cli.base_url, DEFAULT_CONVERTED_BASE_URL);
        assert_eq!(cli.rules_limit, DEFAULT_RULES_LIMIT);
        assert!(!cli.strict);
        assert_eq!(cli.format, OutputFormat::Human);
        assert_eq!(cli.verbose, 0);

        let config = cli.convert_config();
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.converted_base_url, DEFAULT_CONVERTED_BASE_URL);
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "den-blocklists",
            "lists.json",
            "public",
            "--base-url",
            "https://cdn.example.com/lists/",
            "--rules-limit",
            "150000",
            "--strict",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.base_url, "https://cdn.example.com/lists/");
        assert_eq!(cli.converter_config().rules_limit, 150_000);
        assert!(cli.strict);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_requires_both_positionals() {
        assert!(Cli::try_parse_from(["den-blocklists", "lists.json"]).is_err());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = Cli::try_parse_from(["den-blocklists", "a.json", "out", "--base-url", "not a url"])
            .unwrap_err();
        assert!(err.to_string().contains("invalid base URL"), "got: {err}");
    }
}
