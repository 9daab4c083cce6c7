//! Report configuration

use crate::error::{Error, Result};
use crate::report::{ColourScheme, DEFAULT_TABLE_PATH, DEFAULT_TREEMAP_PATH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how the chart and breakdown table are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output path of the SVG treemap
    pub treemap_path: PathBuf,
    /// Output path of the HTML breakdown table
    pub table_path: PathBuf,
    pub title: String,
    /// Stylesheet linked from the HTML table
    pub stylesheet: String,
    pub width: u32,
    pub height: u32,
    pub colours: ColourScheme,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            treemap_path: PathBuf::from(DEFAULT_TREEMAP_PATH),
            table_path: PathBuf::from(DEFAULT_TABLE_PATH),
            title: "Attribute Distribution".to_string(),
            stylesheet: "style.css".to_string(),
            width: 800,
            height: 600,
            colours: ColourScheme::Hashed,
        }
    }
}

impl ReportConfig {
    /// Loads a JSON config; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::resource(path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }
}
