//! Configuration file for `larder`.
//!
//! Every key is optional. Command-line flags override file values, and
//! file values override the built-in defaults.
//!
//! # Example
//!
//! ```toml
//! output_dir = "output"
//! example_limit = 3
//! fail_on = "critical"
//! ```

use std::path::{Path, PathBuf};

use larder_core::Severity;
use larder_report::DEFAULT_EXAMPLE_LIMIT;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "larder.toml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LarderConfig {
    /// Root of etl/, bad_data/ and validation/.
    pub output_dir: Option<PathBuf>,
    /// Example payloads per rule in the report.
    pub example_limit: Option<usize>,
    /// Severity at or above which `check` fails.
    pub fail_on: Option<String>,
}

/// Effective settings after merging defaults, file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub example_limit: usize,
    pub fail_on: Severity,
}

/// Read the config file named by `explicit`, or `larder.toml` if present.
///
/// A missing default file yields an empty config; a missing explicit file
/// is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<LarderConfig, String> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(LarderConfig::default());
            }
            default
        }
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
}

pub fn parse_config(content: &str) -> Result<LarderConfig, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

impl LarderConfig {
    pub fn resolve(
        &self,
        output_dir: Option<PathBuf>,
        fail_on: Option<Severity>,
    ) -> Result<Settings, String> {
        let file_fail_on = match self.fail_on.as_deref() {
            Some(label) => Some(Severity::parse(label).ok_or_else(|| {
                format!(
                    "invalid fail_on '{}'. Valid: critical, high, medium, low",
                    label
                )
            })?),
            None => None,
        };

        Ok(Settings {
            output_dir: output_dir
                .or_else(|| self.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            example_limit: self.example_limit.unwrap_or(DEFAULT_EXAMPLE_LIMIT),
            fail_on: fail_on.or(file_fail_on).unwrap_or(Severity::Critical),
        })
    }
}
