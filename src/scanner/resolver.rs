use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PurgeError, Result};

/// Files matched by a list of glob patterns.
#[derive(Debug, Default, Clone)]
pub struct Resolution {
    /// Matched files, deduplicated, in first-match order
    pub files: Vec<PathBuf>,
    /// Patterns that matched no file
    pub unmatched: Vec<String>,
}

/// Expands descriptor globs relative to a root directory.
pub struct GlobResolver {
    root: PathBuf,
}

impl GlobResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, patterns: &[String]) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut seen = HashSet::new();

        for pattern in patterns {
            let expanded = self.expand(pattern);
            let paths = glob::glob(&expanded).map_err(|e| PurgeError::InvalidGlob {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;

            let mut matched = false;
            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => {
                        matched = true;
                        if seen.insert(path.clone()) {
                            resolution.files.push(path);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping unreadable path for '{}': {}", pattern, e),
                }
            }

            if matched {
                tracing::debug!("'{}' resolved under {}", pattern, self.root.display());
            } else {
                tracing::debug!("'{}' matched nothing under {}", pattern, self.root.display());
                resolution.unmatched.push(pattern.clone());
            }
        }

        Ok(resolution)
    }

    /// Path relative to the root when it lies beneath it.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    fn expand(&self, pattern: &str) -> String {
        if Path::new(pattern).is_absolute() {
            return pattern.to_string();
        }
        // The root is a literal path; only the pattern may carry wildcards.
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        Path::new(&root).join(pattern).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_recursive_html() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "__site/index.html", "");
        create_file(temp_dir.path(), "__site/about/index.html", "");
        create_file(temp_dir.path(), "__site/posts/2024/a.html", "");
        create_file(temp_dir.path(), "__site/css/site.css", "");

        let resolver = GlobResolver::new(temp_dir.path());
        let resolution = resolver
            .resolve(&patterns(&["__site/index.html", "__site/**/*.html"]))
            .unwrap();

        // index.html is matched by both patterns but listed once
        assert_eq!(resolution.files.len(), 3);
        assert_eq!(
            resolver.relative(&resolution.files[0]),
            Path::new("__site/index.html")
        );
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn test_unmatched_patterns_reported() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "_css/bootstrap.min.css", "");

        let resolver = GlobResolver::new(temp_dir.path());
        let resolution = resolver
            .resolve(&patterns(&["_css/bootstrap.min.css", "_libs/katex/katex.min.css"]))
            .unwrap();

        assert_eq!(resolution.files.len(), 1);
        assert_eq!(resolution.unmatched, vec!["_libs/katex/katex.min.css"]);
    }

    #[test]
    fn test_directories_not_matched() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "site/page.html", "");

        let resolver = GlobResolver::new(temp_dir.path());
        let resolution = resolver.resolve(&patterns(&["*"])).unwrap();

        assert!(resolution.files.is_empty());
        assert_eq!(resolution.unmatched, vec!["*"]);
    }

    #[test]
    fn test_invalid_glob() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = GlobResolver::new(temp_dir.path());

        let err = resolver.resolve(&patterns(&["a/***/b"])).unwrap_err();
        assert!(matches!(err, PurgeError::InvalidGlob { pattern, .. } if pattern == "a/***/b"));
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("[docs]");
        create_file(&root, "page.html", "");

        let resolver = GlobResolver::new(&root);
        let resolution = resolver.resolve(&patterns(&["*.html"])).unwrap();

        assert_eq!(resolution.files, vec![root.join("page.html")]);
    }

    #[test]
    fn test_absolute_pattern() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.css", "");
        let absolute = temp_dir.path().join("*.css").to_string_lossy().into_owned();

        let resolver = GlobResolver::new("/nonexistent");
        let resolution = resolver.resolve(&[absolute]).unwrap();

        assert_eq!(resolution.files, vec![temp_dir.path().join("a.css")]);
    }
}
