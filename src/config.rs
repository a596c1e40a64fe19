//! Configuration
//!
//! Settings shared by the CLI and the bridge, read from a JSON file.
//! Missing fields take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bridge::EndpointPolicy;
use crate::error::{GraphError, Result};

/// Node id callers use for the final sink by convention
pub const DESTINATION_ID: &str = "__destination";

/// Audiograph settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Id used for the destination node in generated graphs
    pub destination_id: String,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Reject snapshots with dangling connections instead of skipping them
    pub strict_endpoints: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination_id: DESTINATION_ID.to_string(),
            pretty: true,
            strict_endpoints: false,
        }
    }
}

impl Config {
    /// Load settings from a JSON file
    ///
    /// # Errors
    /// `FileNotFound` if the file does not exist, `Serialization` if it is
    /// not valid JSON for this shape.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| GraphError::FileNotFound {
            path: path.display().to_string(),
            source: Some(e),
        })?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Endpoint policy the bridge should plan with
    pub fn endpoint_policy(&self) -> EndpointPolicy {
        if self.strict_endpoints {
            EndpointPolicy::Reject
        } else {
            EndpointPolicy::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.destination_id, "__destination");
        assert!(config.pretty);
        assert_eq!(config.endpoint_policy(), EndpointPolicy::Skip);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"strictEndpoints": true}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.strict_endpoints);
        assert_eq!(config.destination_id, DESTINATION_ID);
        assert_eq!(config.endpoint_policy(), EndpointPolicy::Reject);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/audiograph.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
