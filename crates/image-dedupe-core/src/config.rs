use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::processing::PHash;

/// Default Hamming distance threshold for perceptual matches
pub const DEFAULT_THRESHOLD: u32 = 5;

/// How files are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMethod {
    /// Byte-identical content, BLAKE3 digest
    Exact,

    /// DCT-based perceptual hash (frequency-domain structure)
    Phash,

    /// Difference hash (horizontal gradient structure)
    Dhash,
}

impl HashMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Phash => "phash",
            Self::Dhash => "dhash",
        }
    }

    pub fn is_perceptual(&self) -> bool {
        !matches!(self, Self::Exact)
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "phash" => Ok(Self::Phash),
            "dhash" => Ok(Self::Dhash),
            other => Err(Error::Configuration(format!(
                "unknown comparison method '{}' (expected exact, phash or dhash)",
                other
            ))),
        }
    }
}

/// Configuration for a duplicate search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comparison method
    pub method: HashMethod,

    /// Maximum Hamming distance (inclusive) for perceptual matches, ignored in exact mode
    pub threshold: u32,

    /// Number of threads to use for hashing (0 = auto)
    pub threads: usize,

    /// Maximum directory depth for scanning
    pub max_depth: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: HashMethod::Exact,
            threshold: DEFAULT_THRESHOLD,
            threads: 0, // Auto
            max_depth: None,
        }
    }
}

impl Config {
    pub fn new(method: HashMethod, threshold: u32) -> Self {
        Self {
            method,
            threshold,
            ..Self::default()
        }
    }

    /// Set the threshold from an unchecked integer, e.g. straight from user input
    pub fn with_raw_threshold(mut self, threshold: i64) -> Result<Self> {
        self.threshold = u32::try_from(threshold).map_err(|_| {
            Error::Configuration(format!(
                "threshold must be between 0 and {}, got {}",
                PHash::BITS,
                threshold
            ))
        })?;
        self.validate()?;
        Ok(self)
    }

    /// Check the configuration before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.threshold > PHash::BITS {
            return Err(Error::Configuration(format!(
                "threshold {} exceeds the fingerprint length of {} bits",
                self.threshold,
                PHash::BITS
            )));
        }
        if self.max_depth == Some(0) {
            return Err(Error::Configuration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            Error::Configuration(format!("{}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
