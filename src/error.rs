use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PurgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid extractor pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },

    #[error("Extension '{extension}' is claimed by rules {first} and {second}")]
    DuplicateExtension {
        extension: String,
        first: usize,
        second: usize,
    },

    #[error("Invalid extension in rule {rule}: '{extension}'")]
    InvalidExtension { rule: usize, extension: String },

    #[error("Extractor rule {0} has no extensions")]
    EmptyRule(usize),

    #[error(
        "Stylesheets {} and {} would both be written to {}",
        .first.display(),
        .second.display(),
        .destination.display()
    )]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },

    #[error("No purge config found in {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Watcher error: {0}")]
    Watcher(String),
}

pub type Result<T> = std::result::Result<T, PurgeError>;
