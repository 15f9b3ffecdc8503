//! Purge configuration descriptor.
//!
//! A [`PurgeConfig`] names the markup files to scan (`content`), the
//! stylesheets to prune (`css`), where pruned output goes (`output`) and the
//! extractor rule for each content file extension.

pub mod format;
pub mod output;

pub use format::{ConfigFormat, ConfigLoader, LoadedConfig, CONFIG_FILENAMES};
pub use output::{OutputEntry, OutputPlan, OutputTarget};

use std::collections::{HashMap, HashSet};
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PurgeError, Result};
use crate::extractor::{ExtractorSpec, RegexExtractor};

/// Content globs shared by every static-site build.
pub const SITE_CONTENT: [&str; 2] = ["__site/index.html", "__site/**/*.html"];

/// A set of file extensions paired with the extractor applied to them.
///
/// Extensions are normalized on every construction path, deserialization
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "RawExtractorRule")]
pub struct ExtractorRule {
    /// Lower-case file extensions without a leading dot
    extensions: Vec<String>,
    /// Extraction strategy for files with these extensions
    extractor: ExtractorSpec,
}

/// Rule as written in a descriptor file, before normalization.
#[derive(Deserialize, JsonSchema)]
struct RawExtractorRule {
    /// File extensions; a leading dot and upper case are accepted
    extensions: Vec<String>,
    /// Extraction strategy for files with these extensions
    #[serde(default)]
    extractor: ExtractorSpec,
}

impl From<RawExtractorRule> for ExtractorRule {
    fn from(raw: RawExtractorRule) -> Self {
        ExtractorRule::new(raw.extensions, raw.extractor)
    }
}

impl ExtractorRule {
    pub fn new<I, S>(extensions: I, extractor: ExtractorSpec) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rule = Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().to_string())
                .collect(),
            extractor,
        };
        rule.normalized()
    }

    /// Identifier extraction over `.html` files.
    pub fn html_identifiers() -> Self {
        Self::new(["html"], ExtractorSpec::Identifier)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn extractor(&self) -> &ExtractorSpec {
        &self.extractor
    }

    fn normalized(mut self) -> Self {
        let mut seen = HashSet::new();
        self.extensions = self
            .extensions
            .into_iter()
            .map(|e| normalize_extension(&e))
            .filter(|e| seen.insert(e.clone()))
            .collect();
        self
    }
}

pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Purge configuration descriptor.
///
/// Immutable once built; construct through [`PurgeConfig::builder`],
/// [`PurgeConfig::site`] or the loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PurgeConfig {
    /// Glob patterns of markup files scanned for used selectors
    content: Vec<String>,
    /// Glob patterns of stylesheets to prune
    css: Vec<String>,
    /// Output path; a trailing separator denotes a directory
    output: String,
    /// Tokens always treated as used
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    safelist: Vec<String>,
    /// Extractor rules, at most one per extension
    #[serde(default)]
    extractors: Vec<ExtractorRule>,
    /// Extractor for content files no rule claims (identifier when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_extractor: Option<ExtractorSpec>,
}

impl PurgeConfig {
    pub fn builder(output: impl Into<String>) -> PurgeConfigBuilder {
        PurgeConfigBuilder::new(output)
    }

    /// The static-site descriptor: every page under `__site/`, identifier
    /// extraction for html. Only the stylesheets and output vary.
    pub fn site<I, S>(css: I, output: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: SITE_CONTENT.iter().map(|s| s.to_string()).collect(),
            css: css.into_iter().map(Into::into).collect(),
            output: output.into(),
            safelist: Vec::new(),
            extractors: vec![ExtractorRule::html_identifiers()],
            default_extractor: None,
        }
    }

    pub fn content(&self) -> &[String] {
        &self.content
    }

    pub fn css(&self) -> &[String] {
        &self.css
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget::parse(&self.output)
    }

    pub fn safelist(&self) -> &[String] {
        &self.safelist
    }

    pub fn extractors(&self) -> &[ExtractorRule] {
        &self.extractors
    }

    pub fn default_extractor(&self) -> Option<&ExtractorSpec> {
        self.default_extractor.as_ref()
    }

    /// Rule claiming `extension`, if any.
    pub fn rule_for(&self, extension: &str) -> Option<&ExtractorRule> {
        let ext = normalize_extension(extension);
        self.extractors
            .iter()
            .find(|rule| rule.extensions.iter().any(|e| *e == ext))
    }

    /// Check the descriptor invariants.
    ///
    /// Structural problems (an extension claimed twice, an empty rule, a
    /// pattern that does not compile) are errors. A descriptor that would
    /// purge nothing is still usable and only produces warnings.
    pub fn validate(&self) -> Result<ValidationReport> {
        let mut claimed: HashMap<&str, usize> = HashMap::new();

        for (index, rule) in self.extractors.iter().enumerate() {
            if rule.extensions.is_empty() {
                return Err(PurgeError::EmptyRule(index));
            }

            for ext in &rule.extensions {
                if !is_valid_extension(ext) {
                    return Err(PurgeError::InvalidExtension {
                        rule: index,
                        extension: ext.clone(),
                    });
                }
                if let Some(&first) = claimed.get(ext.as_str()) {
                    return Err(PurgeError::DuplicateExtension {
                        extension: ext.clone(),
                        first,
                        second: index,
                    });
                }
                claimed.insert(ext.as_str(), index);
            }

            check_spec(&rule.extractor)?;
        }

        if let Some(spec) = &self.default_extractor {
            check_spec(spec)?;
        }

        let mut report = ValidationReport::default();
        if self.content.is_empty() {
            report.warnings.push(ConfigWarning::EmptyContent);
        }
        if self.css.is_empty() {
            report.warnings.push(ConfigWarning::EmptyCss);
        }
        if self.output.trim().is_empty() {
            report.warnings.push(ConfigWarning::EmptyOutput);
        }
        report.warnings.extend(duplicates("content", &self.content));
        report.warnings.extend(duplicates("css", &self.css));

        Ok(report)
    }
}

fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty()
        && !ext
            .chars()
            .any(|c| c.is_whitespace() || c == '.' || std::path::is_separator(c))
}

fn check_spec(spec: &ExtractorSpec) -> Result<()> {
    if let ExtractorSpec::Regex { pattern } = spec {
        RegexExtractor::new(pattern)?;
    }
    Ok(())
}

fn duplicates(field: &'static str, patterns: &[String]) -> Vec<ConfigWarning> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .filter(|p| !seen.insert(p.as_str()))
        .map(|p| ConfigWarning::DuplicatePattern {
            field,
            pattern: p.clone(),
        })
        .collect()
}

/// Non-fatal findings from [`PurgeConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    EmptyContent,
    EmptyCss,
    EmptyOutput,
    DuplicatePattern { field: &'static str, pattern: String },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::EmptyContent => {
                write!(f, "content is empty; no selectors will be considered used")
            }
            ConfigWarning::EmptyCss => write!(f, "css is empty; nothing will be purged"),
            ConfigWarning::EmptyOutput => write!(f, "output is empty"),
            ConfigWarning::DuplicatePattern { field, pattern } => {
                write!(f, "{} lists '{}' more than once", field, pattern)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub warnings: Vec<ConfigWarning>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Builder for [`PurgeConfig`]; `build` validates.
#[derive(Debug, Clone)]
pub struct PurgeConfigBuilder {
    content: Vec<String>,
    css: Vec<String>,
    output: String,
    safelist: Vec<String>,
    extractors: Vec<ExtractorRule>,
    default_extractor: Option<ExtractorSpec>,
}

impl PurgeConfigBuilder {
    fn new(output: impl Into<String>) -> Self {
        Self {
            content: Vec::new(),
            css: Vec::new(),
            output: output.into(),
            safelist: Vec::new(),
            extractors: Vec::new(),
            default_extractor: None,
        }
    }

    pub fn content(mut self, pattern: impl Into<String>) -> Self {
        self.content.push(pattern.into());
        self
    }

    pub fn css(mut self, pattern: impl Into<String>) -> Self {
        self.css.push(pattern.into());
        self
    }

    pub fn safelist(mut self, token: impl Into<String>) -> Self {
        self.safelist.push(token.into());
        self
    }

    pub fn rule(mut self, rule: ExtractorRule) -> Self {
        self.extractors.push(rule);
        self
    }

    pub fn default_extractor(mut self, spec: ExtractorSpec) -> Self {
        self.default_extractor = Some(spec);
        self
    }

    pub fn build(self) -> Result<PurgeConfig> {
        let config = PurgeConfig {
            content: self.content,
            css: self.css,
            output: self.output,
            safelist: self.safelist,
            extractors: self.extractors,
            default_extractor: self.default_extractor,
        };

        config.validate()?;
        Ok(config)
    }
}
