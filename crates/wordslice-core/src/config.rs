//! Configuration structures for the slicing pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the wordslice pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WordsliceConfig {
    /// Frame extraction configuration.
    pub frame: FrameConfig,

    /// Input discovery configuration.
    pub discovery: DiscoveryConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

impl Default for WordsliceConfig {
    fn default() -> Self {
        Self {
            frame: FrameConfig::default(),
            discovery: DiscoveryConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Canonical frame resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Output frame width in pixels.
    pub width: u32,

    /// Output frame height in pixels.
    pub height: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        // Normalizes the aspect-ratio spread of word crops into one shape
        // the downstream batches can stack.
        Self {
            width: 600,
            height: 120,
        }
    }
}

/// File extensions used when discovering inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Page image extension (without the dot).
    pub image_extension: String,

    /// Annotation file extension (without the dot).
    pub annotation_extension: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            image_extension: "jpg".to_string(),
            annotation_extension: "svg".to_string(),
        }
    }
}

/// Where extracted frames are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for frame output, one subdirectory per document.
    pub root: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("output"),
        }
    }
}

impl WordsliceConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_canonical_resolution() {
        let config = WordsliceConfig::default();
        assert_eq!(config.frame.width, 600);
        assert_eq!(config.frame.height, 120);
        assert_eq!(config.discovery.image_extension, "jpg");
        assert_eq!(config.discovery.annotation_extension, "svg");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"frame": {"width": 300}}"#).unwrap();

        let config = WordsliceConfig::from_file(&path).unwrap();
        assert_eq!(config.frame.width, 300);
        assert_eq!(config.frame.height, 120);
    }

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = WordsliceConfig::default();
        config.output.root = PathBuf::from("frames");
        config.save(&path).unwrap();

        let reloaded = WordsliceConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.output.root, PathBuf::from("frames"));
    }
}
