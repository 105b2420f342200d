//! Adapter over the `adblock` crate's Safari content-blocking conversion.
//!
//! Each filter line is parsed and converted on its own so failures can be
//! counted. The conversion itself lives entirely in `adblock`; this module
//! only orders the resulting rules and applies the per-list rule limit.

use adblock::content_blocking::{CbRule, CbRuleEquivalent, CbType};
use adblock::lists::{ParseOptions, ParsedFilter, parse_filter};
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::ConverterConfig;

/// Output of converting one block list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConversionResult {
    /// Content-blocker rules as a JSON array.
    pub converted: String,
    /// Number of rules in `converted`.
    pub converted_count: usize,
    /// Number of filter lines that could not be converted.
    pub errors_count: usize,
    /// Whether rules were dropped to stay within the rule limit.
    pub over_limit: bool,
}

impl ConversionResult {
    #[must_use]
    pub fn new(
        converted: String,
        converted_count: usize,
        errors_count: usize,
        over_limit: bool,
    ) -> Self {
        Self {
            converted,
            converted_count,
            errors_count,
            over_limit,
        }
    }
}

/// The converted rules could not be produced at all.
#[derive(Debug, Error)]
#[error("Failed to convert rules: {0}")]
pub struct ConvertError(pub String);

/// Turns filter-rule lines into a content-blocker rule list.
pub trait RuleConverter {
    /// Convert the given rule lines.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] only when no output can be produced;
    /// individual bad rules are counted in [`ConversionResult::errors_count`].
    fn convert(&self, rules: &[String]) -> Result<ConversionResult, ConvertError>;
}

/// Converter producing Safari content-blocker JSON.
#[derive(Debug, Clone, Default)]
pub struct SafariConverter {
    config: ConverterConfig,
}

/// Prefixes of cosmetic filters that start with `#` and so must not be
/// mistaken for hosts-file comments.
const COSMETIC_SEPARATORS: &[&str] = &[
    "##", "#@#", "#?#", "#@?#", "#$#", "#@$#", "#%#", "#@%#",
];

fn is_comment(line: &str) -> bool {
    line.starts_with('!')
        || (line.starts_with('[') && line.ends_with(']'))
        || (line.starts_with('#')
            && !COSMETIC_SEPARATORS
                .iter()
                .any(|sep| line.starts_with(sep)))
}

impl SafariConverter {
    #[must_use]
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    fn convert_line(line: &str) -> Result<Vec<CbRule>, String> {
        match parse_filter(line, true, ParseOptions::default()) {
            Ok(ParsedFilter::Network(filter)) => CbRuleEquivalent::try_from(filter)
                .map(|equivalent| equivalent.into_iter().collect())
                .map_err(|e| format!("{e:?}")),
            Ok(ParsedFilter::Cosmetic(filter)) => CbRule::try_from(filter)
                .map(|rule| vec![rule])
                .map_err(|e| format!("{e:?}")),
            Err(e) => Err(format!("{e:?}")),
        }
    }

    /// Apply the rule limit. Exception rules are kept first because dropping
    /// one would re-enable blocking on an allow-listed site.
    fn limit_rules(
        &self,
        mut blocking: Vec<CbRule>,
        mut exceptions: Vec<CbRule>,
    ) -> (Vec<CbRule>, bool) {
        let limit = self.config.rules_limit;
        let capacity = limit.saturating_sub(exceptions.len());
        let over_limit = exceptions.len() > limit || blocking.len() > capacity;

        exceptions.truncate(limit);
        blocking.truncate(capacity);

        // ignore-previous-rules only affects rules listed before it.
        blocking.append(&mut exceptions);
        (blocking, over_limit)
    }
}

impl RuleConverter for SafariConverter {
    fn convert(&self, rules: &[String]) -> Result<ConversionResult, ConvertError> {
        let mut blocking = Vec::new();
        let mut exceptions = Vec::new();
        let mut errors_count = 0;

        for line in rules.iter().map(|l| l.trim()) {
            if line.is_empty() || is_comment(line) {
                continue;
            }
            match Self::convert_line(line) {
                Ok(converted) => {
                    for rule in converted {
                        if matches!(rule.action.typ, CbType::IgnorePreviousRules) {
                            exceptions.push(rule);
                        } else {
                            blocking.push(rule);
                        }
                    }
                }
                Err(reason) => {
                    trace!("Skipping rule {line:?}: {reason}");
                    errors_count += 1;
                }
            }
        }

        let (rules, over_limit) = self.limit_rules(blocking, exceptions);
        let converted = serde_json::to_string(&rules).map_err(|e| ConvertError(e.to_string()))?;

        debug!(
            converted = rules.len(),
            errors = errors_count,
            over_limit,
            "Converted rule list"
        );
        Ok(ConversionResult::new(converted, rules.len(), errors_count, over_limit))
    }
}
