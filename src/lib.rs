pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;

pub use config::{
    ConfigFormat, ConfigLoader, ConfigWarning, ExtractorRule, LoadedConfig, OutputEntry,
    OutputPlan, OutputTarget, PurgeConfig, PurgeConfigBuilder, ValidationReport,
};
pub use error::{PurgeError, Result};
pub use extractor::{
    Extractor, ExtractorRegistry, ExtractorSpec, RegexExtractor, IDENTIFIER_PATTERN,
};
pub use scanner::{
    ContentWatcher, FileSummary, FileTokens, GlobResolver, ScanProgress, ScanReport, Scanner,
    SelectorInventory,
};
