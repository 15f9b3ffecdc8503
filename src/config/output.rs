//! Where pruned stylesheets go.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PurgeError, Result};

/// Destination named by a descriptor's `output` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum OutputTarget {
    /// One output file per stylesheet, keeping file names
    Directory(PathBuf),
    /// All stylesheets merged into one file
    File(PathBuf),
}

impl OutputTarget {
    /// A trailing path separator denotes a directory.
    pub fn parse(output: &str) -> Self {
        if output.chars().last().is_some_and(std::path::is_separator) {
            OutputTarget::Directory(PathBuf::from(output))
        } else {
            OutputTarget::File(PathBuf::from(output))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            OutputTarget::Directory(p) | OutputTarget::File(p) => p,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, OutputTarget::Directory(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Source stylesheet to destination mapping for one purge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPlan {
    pub merged: bool,
    pub entries: Vec<OutputEntry>,
}

impl OutputPlan {
    pub fn build(target: &OutputTarget, stylesheets: &[PathBuf]) -> Result<Self> {
        match target {
            OutputTarget::File(dest) => Ok(Self {
                merged: true,
                entries: stylesheets
                    .iter()
                    .map(|source| OutputEntry {
                        source: source.clone(),
                        destination: dest.clone(),
                    })
                    .collect(),
            }),
            OutputTarget::Directory(dir) => {
                let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::new();
                let mut entries = Vec::with_capacity(stylesheets.len());

                for source in stylesheets {
                    let Some(name) = source.file_name() else {
                        continue;
                    };
                    let destination = dir.join(name);
                    if let Some(first) = claimed.insert(destination.clone(), source) {
                        return Err(PurgeError::OutputCollision {
                            first: first.clone(),
                            second: source.clone(),
                            destination,
                        });
                    }
                    entries.push(OutputEntry {
                        source: source.clone(),
                        destination,
                    });
                }

                Ok(Self {
                    merged: false,
                    entries,
                })
            }
        }
    }

    /// Distinct destinations in plan order.
    pub fn destinations(&self) -> Vec<&Path> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.destination.as_path()) {
                seen.push(entry.destination.as_path());
            }
        }
        seen
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
