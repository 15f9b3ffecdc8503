//! Selector token extraction.
//!
//! An extractor turns the raw text of a content file into the candidate
//! selector tokens a purge engine treats as "used". Extraction is infallible:
//! a file with no candidates yields an empty vector.

pub mod registry;

pub use registry::ExtractorRegistry;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PurgeError, Result};

/// Letters, digits, `_`, `:`, `/` and `-`. Covers utility-class names such as
/// `md:w-1/2` as well as plain class and id names.
pub const IDENTIFIER_PATTERN: &str = r"[A-Za-z0-9_:/-]+";

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"));

pub trait Extractor: Send + Sync {
    fn name(&self) -> &str;

    /// Every candidate token in `content`, left to right, duplicates kept.
    fn extract(&self, content: &str) -> Vec<String>;
}

/// Extractor yielding each non-overlapping match of a regular expression.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    name: String,
    regex: Regex,
}

impl RegexExtractor {
    /// The built-in identifier extractor.
    pub fn identifier() -> Self {
        Self {
            name: "identifier".to_string(),
            regex: IDENTIFIER_REGEX.clone(),
        }
    }

    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| PurgeError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: format!("regex({})", pattern),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl Extractor for RegexExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, content: &str) -> Vec<String> {
        // A custom pattern may match the empty string; those are not tokens.
        self.regex
            .find_iter(content)
            .filter(|m| !m.as_str().is_empty())
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Serializable description of an extraction strategy.
///
/// Descriptor files cannot carry functions, so each rule names its strategy
/// and the registry resolves it to an [`Extractor`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractorSpec {
    /// Identifier-like substrings (`[A-Za-z0-9-_:/]+`)
    #[default]
    Identifier,
    /// Every non-overlapping match of a custom regular expression
    Regex {
        /// Regular expression in Rust `regex` syntax
        pattern: String,
    },
}

impl ExtractorSpec {
    pub fn regex(pattern: impl Into<String>) -> Self {
        ExtractorSpec::Regex {
            pattern: pattern.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExtractorSpec::Identifier => "identifier",
            ExtractorSpec::Regex { .. } => "regex",
        }
    }

    pub fn resolve(&self) -> Result<Arc<dyn Extractor>> {
        match self {
            ExtractorSpec::Identifier => Ok(Arc::new(RegexExtractor::identifier())),
            ExtractorSpec::Regex { pattern } => Ok(Arc::new(RegexExtractor::new(pattern)?)),
        }
    }
}
