//! Extraction configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// Configuration for one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workbook to read
    pub source: PathBuf,
    /// Directory where extracted images land (created if absent)
    pub image_dir: PathBuf,
    /// Path of the JSON record list
    pub output: PathBuf,
    /// Column letter whose anchors are checked for product images
    pub image_column: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::from("OnePager New MRP.xlsx"),
            image_dir: PathBuf::from("img"),
            output: PathBuf::from("output.json"),
            image_column: "A".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 1-based index of the image-bearing column
    pub fn image_column_index(&self) -> Result<u32, SetupError> {
        column_index(&self.image_column)
            .ok_or_else(|| SetupError::BadImageColumn(self.image_column.clone()))
    }
}

/// Convert a column letter to a 1-based index ("A" -> 1, "Z" -> 26, "AA" -> 27)
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0u32;
    for ch in letters.chars() {
        let ch = ch.to_ascii_uppercase();
        if !ch.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (ch as u32 - 'A' as u32 + 1);
    }
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("a"), Some(1));
        assert_eq!(column_index("D"), Some(4));
        assert_eq!(column_index("Z"), Some(26));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("AZ"), Some(52));
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.image_dir, PathBuf::from("img"));
        assert_eq!(config.output, PathBuf::from("output.json"));
        assert_eq!(config.image_column_index().unwrap(), 1);
    }

    #[test]
    fn test_config_from_toml() {
        let config: Config = toml::from_str(
            r#"
            source = "catalog.xlsx"
            image_column = "B"
            "#,
        )
        .unwrap();

        // Explicit fields are taken, the rest fall back to defaults
        assert_eq!(config.source, PathBuf::from("catalog.xlsx"));
        assert_eq!(config.image_column_index().unwrap(), 2);
        assert_eq!(config.output, PathBuf::from("output.json"));
    }

    #[test]
    fn test_bad_image_column_is_setup_error() {
        let config = Config {
            image_column: "7".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.image_column_index(),
            Err(SetupError::BadImageColumn(_))
        ));
    }
}
