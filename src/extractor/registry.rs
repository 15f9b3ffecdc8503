use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::PurgeConfig;
use crate::error::Result;

use super::{Extractor, ExtractorSpec};

/// Maps file extensions to the extractor of the rule claiming them.
pub struct ExtractorRegistry {
    extractors: Vec<Arc<dyn Extractor>>,
    extension_map: HashMap<String, usize>,
    fallback: Arc<dyn Extractor>,
}

impl ExtractorRegistry {
    pub fn from_config(config: &PurgeConfig) -> Result<Self> {
        config.validate()?;

        let mut registry = Self {
            extractors: Vec::with_capacity(config.extractors().len()),
            extension_map: HashMap::new(),
            fallback: config
                .default_extractor()
                .cloned()
                .unwrap_or_default()
                .resolve()?,
        };

        for rule in config.extractors() {
            let index = registry.extractors.len();
            registry.extractors.push(rule.extractor().resolve()?);
            for ext in rule.extensions() {
                registry.extension_map.insert(ext.clone(), index);
            }
        }

        Ok(registry)
    }

    /// Registry with no rules; every file goes through `fallback`.
    pub fn with_fallback(fallback: &ExtractorSpec) -> Result<Self> {
        Ok(Self {
            extractors: Vec::new(),
            extension_map: HashMap::new(),
            fallback: fallback.resolve()?,
        })
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Extractor>> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        self.extension_map
            .get(&ext)
            .and_then(|&index| self.extractors.get(index))
    }

    pub fn for_extension(&self, extension: &str) -> &Arc<dyn Extractor> {
        self.get(extension).unwrap_or(&self.fallback)
    }

    pub fn for_path(&self, path: &Path) -> &Arc<dyn Extractor> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.for_extension(ext),
            None => &self.fallback,
        }
    }

    pub fn fallback(&self) -> &Arc<dyn Extractor> {
        &self.fallback
    }

    pub fn is_claimed(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.get(ext).is_some())
    }

    /// Claimed extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extension_map.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorRule;

    fn create_registry() -> ExtractorRegistry {
        let config = PurgeConfig::builder("__site/css/")
            .content("__site/**/*.html")
            .css("_css/site.css")
            .rule(ExtractorRule::html_identifiers())
            .rule(ExtractorRule::new(["vue", "svelte"], ExtractorSpec::regex(r"[a-z-]+")))
            .build()
            .unwrap();
        ExtractorRegistry::from_config(&config).unwrap()
    }

    #[test]
    fn test_extensions_sorted() {
        let registry = create_registry();
        assert_eq!(registry.extensions(), vec!["html", "svelte", "vue"]);
    }

    #[test]
    fn test_for_path_uses_claiming_rule() {
        let registry = create_registry();
        let extractor = registry.for_path(Path::new("src/App.vue"));
        assert_eq!(extractor.extract("FOO bar-baz 42"), vec!["bar-baz"]);
    }

    #[test]
    fn test_extension_lookup_is_case_insensitive() {
        let registry = create_registry();
        assert!(registry.get("HTML").is_some());
        assert!(registry.get(".html").is_some());
        assert!(registry.is_claimed(Path::new("INDEX.HTML")));
    }

    #[test]
    fn test_unclaimed_extension_falls_back() {
        let registry = create_registry();
        assert!(registry.get("md").is_none());
        assert!(!registry.is_claimed(Path::new("README.md")));
        assert_eq!(registry.for_path(Path::new("README.md")).name(), "identifier");
        assert_eq!(registry.for_path(Path::new("Makefile")).name(), "identifier");
    }

    #[test]
    fn test_upper_case_rule_applies_after_deserialize() {
        let json = r#"{"content": ["*.html"], "css": ["a.css"], "output": "out/",
            "extractors": [
                {"extensions": ["HTML"], "extractor": {"kind": "regex", "pattern": "[0-9]+"}}
            ]}"#;
        let config: PurgeConfig = serde_json::from_str(json).unwrap();
        let registry = ExtractorRegistry::from_config(&config).unwrap();

        let extractor = registry.for_path(Path::new("page.html"));
        assert_eq!(extractor.name(), "regex([0-9]+)");
        assert_eq!(extractor.extract("h1 p2"), vec!["1", "2"]);
    }

    #[test]
    fn test_custom_fallback() {
        let config = PurgeConfig::builder("out.css")
            .content("*.txt")
            .css("a.css")
            .default_extractor(ExtractorSpec::regex(r"\d+"))
            .build()
            .unwrap();
        let registry = ExtractorRegistry::from_config(&config).unwrap();

        assert_eq!(registry.for_path(Path::new("a.txt")).extract("x1 y23"), vec!["1", "23"]);
    }

    #[test]
    fn test_with_fallback_only() {
        let registry = ExtractorRegistry::with_fallback(&ExtractorSpec::Identifier).unwrap();
        assert!(registry.extensions().is_empty());
        assert_eq!(registry.for_extension("html").extract("a b"), vec!["a", "b"]);
    }
}
