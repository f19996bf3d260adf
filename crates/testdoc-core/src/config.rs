//! Configuration handling for testdoc

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::TestDocError;

/// Name of the optional configuration file looked up in the source root.
pub const CONFIG_FILE_NAME: &str = "testdoc.toml";

/// testdoc configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Discovery and rendering settings
    #[serde(default)]
    pub testdoc: DocConfig,
}

/// Discovery and rendering settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocConfig {
    /// Prefix marking top-level test functions
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,

    /// Method name that registers a sub-test
    #[serde(default = "default_run_method")]
    pub run_method: String,

    /// Maximum bytes between a comment's end and the code it documents
    #[serde(default = "default_max_comment_gap")]
    pub max_comment_gap: usize,

    /// Extra directory names skipped during discovery
    #[serde(default)]
    pub exclude_dirs: Vec<String>,

    /// Maximum failure-message characters in reports (0 hides failures)
    #[serde(default = "default_fail_snippet")]
    pub fail_snippet: usize,
}

fn default_test_prefix() -> String {
    "Test".to_string()
}

fn default_run_method() -> String {
    "Run".to_string()
}

fn default_max_comment_gap() -> usize {
    10
}

fn default_fail_snippet() -> usize {
    300
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            test_prefix: default_test_prefix(),
            run_method: default_run_method(),
            max_comment_gap: default_max_comment_gap(),
            exclude_dirs: Vec::new(),
            fail_snippet: default_fail_snippet(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, TestDocError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TestDocError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| TestDocError::config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `testdoc.toml` from the given source root, or defaults if absent
    pub fn load_from_root(root: &Path) -> Result<Self, TestDocError> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load(&config_path)
        } else {
            Ok(Config::default())
        }
    }
}
