use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use site_purge::{
    ConfigFormat, ConfigLoader, ContentWatcher, ExtractorRegistry, LoadedConfig, PurgeConfig,
    PurgeError, ScanReport, Scanner,
};

#[derive(Parser)]
#[command(name = "site-purge")]
#[command(about = "Check CSS purge descriptors and extract the selectors a site uses")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Validate purge.toml in the current directory
    site-purge check

    # Tokens the html rule extracts from a page
    site-purge extract __site/index.html

    # Tokens from stdin, using the rule for .vue files
    cat App.vue | site-purge extract --ext vue

    # Selector inventory and output plan as JSON
    site-purge scan --format json

    # Re-scan whenever content changes
    site-purge scan --watch

    # Write a starter descriptor
    site-purge init --css _css/bootstrap.min.css --output __site/css/
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the purge descriptor (default: discover purge.{toml,json,yaml,yml})
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory globs are resolved against (default: the descriptor's directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate the descriptor
    Check,

    /// Print the tokens extracted from a file or stdin
    Extract {
        /// File to extract from (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Extension selecting the rule (defaults to the file's extension)
        #[arg(long)]
        ext: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Extract tokens from all content files and report the selector inventory
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Re-scan when files under the root change
        #[arg(long)]
        watch: bool,
    },

    /// Show where each stylesheet's pruned output goes
    Plan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write a starter descriptor for a static site
    Init {
        /// Stylesheet globs to prune
        #[arg(long, default_value = "_css/bootstrap.min.css")]
        css: Vec<String>,

        /// Output directory (trailing slash) or merged file
        #[arg(long, default_value = "__site/css/")]
        output: String,

        /// Descriptor format (toml, json or yaml); ignored when --config names the file
        #[arg(long, default_value = "toml")]
        format: String,

        /// Overwrite an existing descriptor
        #[arg(long)]
        force: bool,
    },

    /// Print the descriptor's JSON schema
    Schema,
}

fn load(config: Option<&Path>, root: Option<&Path>) -> anyhow::Result<(LoadedConfig, PathBuf)> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => ConfigLoader::discover(root.unwrap_or(Path::new(".")))?,
    };
    let loaded =
        ConfigLoader::load(&path).with_context(|| format!("loading {}", path.display()))?;
    let root = root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| loaded.base_dir());
    Ok((loaded, root))
}

pub fn check(config: Option<&Path>, root: Option<&Path>) -> anyhow::Result<()> {
    let (loaded, root) = load(config, root)?;
    let cfg = &loaded.config;

    println!("{}: ok", loaded.path.display());
    println!("  content:    {} patterns", cfg.content().len());
    println!("  css:        {} patterns", cfg.css().len());
    println!(
        "  output:     {} ({})",
        cfg.output(),
        if cfg.output_target().is_directory() {
            "directory"
        } else {
            "merged file"
        }
    );
    for rule in cfg.extractors() {
        println!(
            "  extractor:  {} -> {}",
            rule.extensions().join(", "),
            rule.extractor().kind()
        );
    }
    println!("  root:       {}", root.display());

    for warning in &loaded.warnings {
        println!("  warning: {}", warning);
    }

    Ok(())
}

pub fn extract(
    config: Option<&Path>,
    root: Option<&Path>,
    file: Option<&Path>,
    ext: Option<&str>,
    format: &str,
) -> anyhow::Result<()> {
    let registry = match load(config, root) {
        Ok((loaded, _)) => ExtractorRegistry::from_config(&loaded.config)?,
        Err(e) if config.is_none() && is_not_found(&e) => {
            tracing::debug!("No descriptor found, using the site preset");
            ExtractorRegistry::from_config(&PurgeConfig::site(Vec::<String>::new(), ""))?
        }
        Err(e) => return Err(e),
    };

    let (content, extractor) = match file {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let extractor = match ext {
                Some(ext) => registry.for_extension(ext),
                None => registry.for_path(path),
            };
            (String::from_utf8_lossy(&bytes).into_owned(), extractor)
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            let extractor = match ext {
                Some(ext) => registry.for_extension(ext),
                None => registry.fallback(),
            };
            (buf, extractor)
        }
    };

    let tokens = extractor.extract(&content);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(())
}

fn is_not_found(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<PurgeError>(),
        Some(PurgeError::ConfigNotFound(_))
    )
}

pub fn scan(
    config: Option<&Path>,
    root: Option<&Path>,
    format: &str,
    watch: bool,
) -> anyhow::Result<()> {
    let (loaded, root) = load(config, root)?;
    let scanner = Scanner::new(loaded.config, &root)?;

    let report = scanner.scan()?;
    print_report(&report, format)?;

    if watch {
        println!("Watching {} for changes...", root.display());
        let watcher = ContentWatcher::new(&root)?;

        loop {
            if let Some(changed) = watcher.recv() {
                tracing::debug!("{} paths changed", changed.len());
                match scanner.scan() {
                    Ok(report) => print_report(&report, format)?,
                    Err(e) => eprintln!("Scan failed: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &ScanReport, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for file in &report.files {
        println!(
            "{} ({}) - {} tokens",
            file.path.display(),
            file.extractor,
            file.token_count
        );
    }
    for path in &report.unreadable {
        println!("{} - unreadable", path.display());
    }
    for pattern in &report.unmatched_patterns {
        println!("warning: '{}' matched no files", pattern);
    }
    println!(
        "Scanned {} files: {} tokens, {} distinct selectors, {} stylesheets",
        report.files.len(),
        report.total_tokens(),
        report.inventory.len(),
        report.plan.entries.len()
    );

    Ok(())
}

pub fn plan(config: Option<&Path>, root: Option<&Path>, format: &str) -> anyhow::Result<()> {
    let (loaded, root) = load(config, root)?;
    let scanner = Scanner::new(loaded.config, &root)?;
    let plan = scanner.plan()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if plan.is_empty() {
        println!("No stylesheets matched");
        return Ok(());
    }

    for entry in &plan.entries {
        println!(
            "{} -> {}",
            entry.source.display(),
            entry.destination.display()
        );
    }
    if plan.merged {
        println!("{} stylesheets merged into one file", plan.entries.len());
    }

    Ok(())
}

pub fn init(
    config: Option<&Path>,
    root: Option<&Path>,
    css: Vec<String>,
    output: String,
    format: &str,
    force: bool,
) -> anyhow::Result<()> {
    let path = match config {
        Some(path) => path.to_path_buf(),
        None => {
            let format: ConfigFormat = format.parse()?;
            root.unwrap_or(Path::new("."))
                .join(format!("purge.{}", format.extension()))
        }
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let descriptor = PurgeConfig::site(css, output);
    descriptor.validate()?;
    ConfigLoader::save(&descriptor, &path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());

    Ok(())
}

pub fn print_schema() -> anyhow::Result<()> {
    let schema = schemars::schema_for!(PurgeConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site_css() -> Vec<String> {
        vec!["_css/bootstrap.min.css".to_string()]
    }

    #[test]
    fn test_init_writes_to_config_path() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("conf/site-purge.json");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();

        init(
            Some(&target),
            Some(temp_dir.path()),
            site_css(),
            "__site/css/".to_string(),
            "toml",
            false,
        )
        .unwrap();

        assert!(target.exists());
        assert!(!temp_dir.path().join("purge.toml").exists());

        let loaded = ConfigLoader::load(&target).unwrap();
        assert_eq!(loaded.config.css(), &["_css/bootstrap.min.css".to_string()]);
        assert_eq!(loaded.config.output(), "__site/css/");
    }

    #[test]
    fn test_init_defaults_to_root() {
        let temp_dir = TempDir::new().unwrap();

        init(
            None,
            Some(temp_dir.path()),
            site_css(),
            "__site/css/".to_string(),
            "yaml",
            false,
        )
        .unwrap();

        assert!(temp_dir.path().join("purge.yaml").exists());
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("custom.toml");
        std::fs::write(&target, "# keep me\n").unwrap();

        let result = init(
            Some(&target),
            None,
            site_css(),
            "__site/css/".to_string(),
            "toml",
            false,
        );
        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# keep me\n");

        init(
            Some(&target),
            None,
            site_css(),
            "__site/css/".to_string(),
            "toml",
            true,
        )
        .unwrap();
        assert!(ConfigLoader::load(&target).is_ok());
    }
}
