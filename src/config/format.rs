//! Descriptor file formats and discovery.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{PurgeError, Result};

use super::{ConfigWarning, PurgeConfig};

/// File names tried by [`ConfigLoader::discover`], in order.
pub const CONFIG_FILENAMES: [&str; 4] = ["purge.toml", "purge.json", "purge.yaml", "purge.yml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
            ConfigFormat::Yaml => "yaml",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = PurgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            other => Err(PurgeError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl PurgeConfig {
    /// Parse a descriptor. Does not validate.
    pub fn from_str_format(text: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Toml => toml::from_str(text)?,
            ConfigFormat::Json => serde_json::from_str(text)?,
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
        };
        Ok(config)
    }

    pub fn to_string_format(&self, format: ConfigFormat) -> Result<String> {
        let text = match format {
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(text)
    }

    /// Read, parse and validate a descriptor file.
    pub fn from_path(path: &Path) -> Result<Self> {
        ConfigLoader::load(path).map(|loaded| loaded.config)
    }
}

/// A validated descriptor together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PurgeConfig,
    pub path: PathBuf,
    pub warnings: Vec<ConfigWarning>,
}

impl LoadedConfig {
    /// Directory the descriptor's globs are relative to.
    pub fn base_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// First of [`CONFIG_FILENAMES`] present in `dir`.
    pub fn discover(dir: &Path) -> Result<PathBuf> {
        CONFIG_FILENAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| PurgeError::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn load(path: &Path) -> Result<LoadedConfig> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let config = PurgeConfig::from_str_format(&text, format)?;
        let report = config.validate()?;

        for warning in &report.warnings {
            tracing::warn!("{}: {}", path.display(), warning);
        }
        tracing::debug!(
            "Loaded {} ({} content, {} css, {} rules)",
            path.display(),
            config.content().len(),
            config.css().len(),
            config.extractors().len()
        );

        Ok(LoadedConfig {
            config,
            path: path.to_path_buf(),
            warnings: report.warnings,
        })
    }

    pub fn save(config: &PurgeConfig, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)?;
        std::fs::write(path, config.to_string_format(format)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorRule;
    use crate::extractor::ExtractorSpec;
    use std::fs;
    use tempfile::TempDir;

    const SITE_TOML: &str = r#"
content = ["__site/index.html", "__site/**/*.html"]
css = ["_css/bootstrap.min.css", "_libs/highlight/github.min.css", "_libs/katex/katex.min.css"]
output = "__site/css/"

[[extractors]]
extensions = ["html"]
extractor = { kind = "identifier" }
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path(Path::new("purge.toml")).unwrap(), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("a/purge.JSON")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("purge.yml")).unwrap(), ConfigFormat::Yaml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("purgecss.config.js")),
            Err(PurgeError::UnsupportedFormat(ext)) if ext == "js"
        ));
        assert!(ConfigFormat::from_path(Path::new("purge")).is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config = PurgeConfig::from_str_format(SITE_TOML, ConfigFormat::Toml).unwrap();

        assert_eq!(config.css().len(), 3);
        assert_eq!(config.output(), "__site/css/");
        assert_eq!(config.extractors(), &[ExtractorRule::html_identifiers()]);
    }

    #[test]
    fn test_extractor_defaults_to_identifier() {
        let text = r#"
content = ["*.html"]
css = ["a.css"]
output = "out.css"

[[extractors]]
extensions = [".HTML"]
"#;
        let config = PurgeConfig::from_str_format(text, ConfigFormat::Toml).unwrap();
        assert_eq!(config.extractors()[0].extensions(), &["html"]);
        assert_eq!(config.extractors()[0].extractor(), &ExtractorSpec::Identifier);
    }

    #[test]
    fn test_parse_json_regex_rule() {
        let text = r#"{
            "content": ["src/**/*.vue"],
            "css": ["dist/app.css"],
            "output": "dist/app.purged.css",
            "extractors": [
                {"extensions": ["vue"], "extractor": {"kind": "regex", "pattern": "[\\w:/-]+"}}
            ],
            "safelist": ["active"]
        }"#;
        let config = PurgeConfig::from_str_format(text, ConfigFormat::Json).unwrap();

        assert_eq!(
            config.extractors()[0].extractor(),
            &ExtractorSpec::regex(r"[\w:/-]+")
        );
        assert_eq!(config.safelist(), &["active"]);
    }

    #[test]
    fn test_parse_yaml() {
        let text = r#"
content: ["__site/**/*.html"]
css: ["_css/tailwind.min.css"]
output: __site/css/tailwind.min.css
default_extractor:
  kind: regex
  pattern: "[a-z]+"
"#;
        let config = PurgeConfig::from_str_format(text, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.output(), "__site/css/tailwind.min.css");
        assert!(config.extractors().is_empty());
        assert_eq!(config.default_extractor(), Some(&ExtractorSpec::regex("[a-z]+")));
    }

    #[test]
    fn test_unknown_extractor_kind_rejected() {
        let text = r#"{"content": [], "css": [], "output": "o/",
            "extractors": [{"extensions": ["html"], "extractor": {"kind": "javascript"}}]}"#;
        assert!(matches!(
            PurgeConfig::from_str_format(text, ConfigFormat::Json),
            Err(PurgeError::Json(_))
        ));
    }

    #[test]
    fn test_discover_order() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            ConfigLoader::discover(temp_dir.path()),
            Err(PurgeError::ConfigNotFound(_))
        ));

        fs::write(temp_dir.path().join("purge.yml"), "").unwrap();
        fs::write(temp_dir.path().join("purge.json"), "").unwrap();
        assert_eq!(
            ConfigLoader::discover(temp_dir.path()).unwrap(),
            temp_dir.path().join("purge.json")
        );
    }

    #[test]
    fn test_load_reports_warnings() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("purge.toml");
        fs::write(&path, "content = []\ncss = [\"a.css\"]\noutput = \"out/\"\n").unwrap();

        let loaded = ConfigLoader::load(&path).unwrap();
        assert_eq!(loaded.warnings, vec![ConfigWarning::EmptyContent]);
        assert_eq!(loaded.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_load_rejects_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("purge.toml");
        fs::write(
            &path,
            r#"
content = ["*.html"]
css = ["a.css"]
output = "out/"

[[extractors]]
extensions = ["html"]

[[extractors]]
extensions = ["html"]
extractor = { kind = "regex", pattern = "[a-z]+" }
"#,
        )
        .unwrap();

        assert!(matches!(
            ConfigLoader::load(&path),
            Err(PurgeError::DuplicateExtension { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("purge.yaml");
        let config = PurgeConfig::site(["_css/bootstrap.min.css"], "__site/css/");

        ConfigLoader::save(&config, &path).unwrap();
        assert_eq!(PurgeConfig::from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_base_dir_of_bare_file_name() {
        let loaded = LoadedConfig {
            config: PurgeConfig::site(["a.css"], "out/"),
            path: PathBuf::from("purge.toml"),
            warnings: Vec::new(),
        };
        assert_eq!(loaded.base_dir(), PathBuf::from("."));
    }
}
