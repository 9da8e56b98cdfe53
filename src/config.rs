//! Scan configuration
//!
//! File scanners are configured from YAML:
//!
//! ```yaml
//! profile: record      # record | mmi
//! on_error: resync     # resync | abort
//! max_errors: 100      # optional
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::HeaderProfile;

/// On-disk file family being scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileProfile {
    /// Concatenated `header + length + body` records.
    #[default]
    Record,
    /// MMI-profile headers followed directly by their payload.
    Mmi,
}

impl FileProfile {
    /// Header layout used by this file family.
    pub fn header_profile(self) -> HeaderProfile {
        match self {
            FileProfile::Record => HeaderProfile::Record,
            FileProfile::Mmi => HeaderProfile::MmiFile,
        }
    }
}

/// What a scanner does when a record fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Advance one byte and try again.
    #[default]
    Resync,
    /// Stop and return the error.
    Abort,
}

/// Configuration for file scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub profile: FileProfile,
    pub on_error: ErrorPolicy,
    /// Abort once more than this many resynchronisations happen.
    pub max_errors: Option<usize>,
}

impl ScanConfig {
    /// Parse a configuration from YAML text.
    ///
    /// ```rust
    /// use atp_decode::config::{ErrorPolicy, FileProfile, ScanConfig};
    ///
    /// let config = ScanConfig::from_yaml_str("profile: mmi\non_error: abort\n")?;
    /// assert_eq!(config.profile, FileProfile::Mmi);
    /// assert_eq!(config.on_error, ErrorPolicy::Abort);
    /// assert_eq!(config.max_errors, None);
    /// # Ok::<(), atp_decode::Error>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(yaml)
            .map_err(|e| Error::config("scan configuration", e.to_string()))
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| Error::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml_str(&yaml)?;
        debug!(path = %path.display(), ?config, "Loaded scan configuration");
        Ok(config)
    }

    /// Builder-style profile override.
    pub fn with_profile(mut self, profile: FileProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Builder-style error policy override.
    pub fn with_policy(mut self, on_error: ErrorPolicy) -> Self {
        self.on_error = on_error;
        self
    }

    /// Builder-style error limit.
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }
}
