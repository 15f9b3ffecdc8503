//! Content scanning.
//!
//! Resolves a descriptor's globs, runs the matching extractor over every
//! content file and collects the selector inventory a purge engine keeps,
//! alongside the stylesheet output plan.

pub mod progress;
pub mod resolver;
pub mod watcher;

pub use progress::{ProgressSnapshot, ScanProgress};
pub use resolver::{GlobResolver, Resolution};
pub use watcher::ContentWatcher;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{OutputPlan, PurgeConfig};
use crate::error::Result;
use crate::extractor::ExtractorRegistry;

/// Tokens extracted from a single content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTokens {
    pub path: PathBuf,
    pub extractor: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub extractor: String,
    pub token_count: usize,
}

/// Deduplicated, sorted set of tokens treated as used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectorInventory {
    tokens: BTreeSet<String>,
}

impl SelectorInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.tokens.insert(token.into())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<S> for SelectorInventory {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.tokens.extend(iter.into_iter().map(Into::into));
    }
}

impl<S: Into<String>> FromIterator<S> for SelectorInventory {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut inventory = Self::new();
        inventory.extend(iter);
        inventory
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub files: Vec<FileSummary>,
    pub unreadable: Vec<PathBuf>,
    pub unmatched_patterns: Vec<String>,
    pub plan: OutputPlan,
    pub inventory: SelectorInventory,
}

impl ScanReport {
    pub fn total_tokens(&self) -> usize {
        self.files.iter().map(|f| f.token_count).sum()
    }
}

pub struct Scanner {
    config: PurgeConfig,
    registry: ExtractorRegistry,
    resolver: GlobResolver,
    progress: ScanProgress,
}

impl Scanner {
    pub fn new(config: PurgeConfig, root: impl Into<PathBuf>) -> Result<Self> {
        let registry = ExtractorRegistry::from_config(&config)?;
        Ok(Self {
            config,
            registry,
            resolver: GlobResolver::new(root),
            progress: ScanProgress::new(),
        })
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    pub fn progress(&self) -> &ScanProgress {
        &self.progress
    }

    pub fn resolve_content(&self) -> Result<Resolution> {
        self.resolver.resolve(self.config.content())
    }

    pub fn resolve_css(&self) -> Result<Resolution> {
        self.resolver.resolve(self.config.css())
    }

    /// Stylesheet destinations, with paths relative to the root.
    pub fn plan(&self) -> Result<OutputPlan> {
        let css = self.resolve_css()?;
        self.plan_for(&css.files)
    }

    fn plan_for(&self, stylesheets: &[PathBuf]) -> Result<OutputPlan> {
        let relative: Vec<PathBuf> = stylesheets
            .iter()
            .map(|p| self.resolver.relative(p).to_path_buf())
            .collect();
        OutputPlan::build(&self.config.output_target(), &relative)
    }

    pub fn extract_file(&self, path: &Path) -> Result<FileTokens> {
        let bytes = std::fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);
        let extractor = self.registry.for_path(path);

        Ok(FileTokens {
            path: self.resolver.relative(path).to_path_buf(),
            extractor: extractor.name().to_string(),
            tokens: extractor.extract(&content),
        })
    }

    pub fn scan(&self) -> Result<ScanReport> {
        let content = self.resolve_content()?;
        let css = self.resolve_css()?;
        let plan = self.plan_for(&css.files)?;

        tracing::debug!(
            "Scanning {} content files under {}",
            content.files.len(),
            self.root().display()
        );
        self.progress.start(content.files.len());

        let results: Vec<(&PathBuf, Result<FileTokens>)> = content
            .files
            .par_iter()
            .map(|file| {
                let result = self.extract_file(file);
                match &result {
                    Ok(tokens) => self.progress.inc(tokens.tokens.len()),
                    Err(_) => self.progress.inc_error(),
                }
                (file, result)
            })
            .collect();

        let mut inventory: SelectorInventory = self.config.safelist().iter().cloned().collect();
        let mut files = Vec::with_capacity(results.len());
        let mut unreadable = Vec::new();

        for (path, result) in results {
            match result {
                Ok(file_tokens) => {
                    files.push(FileSummary {
                        path: file_tokens.path,
                        extractor: file_tokens.extractor,
                        token_count: file_tokens.tokens.len(),
                    });
                    inventory.extend(file_tokens.tokens);
                }
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    unreadable.push(self.resolver.relative(path).to_path_buf());
                }
            }
        }
        self.progress.finish();

        let mut unmatched_patterns = content.unmatched;
        unmatched_patterns.extend(css.unmatched);

        tracing::info!(
            "Scanned {} files: {} distinct tokens, {} stylesheets",
            files.len(),
            inventory.len(),
            plan.entries.len()
        );

        Ok(ScanReport {
            root: self.root().to_path_buf(),
            files,
            unreadable,
            unmatched_patterns,
            plan,
            inventory,
        })
    }
}
