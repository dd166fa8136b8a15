//! Declarative document loading
//!
//! Resource manifests, level manifests and the app config all go through
//! here. The format is picked from the file extension: `.toml` or `.ron`.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("I/O error reading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse '{0}': {1}")]
    Parse(PathBuf, String),

    #[error("unsupported manifest format for '{0}' (expected .toml or .ron)")]
    UnsupportedFormat(PathBuf),
}

/// Text formats a manifest can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Ron,
}

impl ManifestFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(ManifestFormat::Toml),
            "ron" => Some(ManifestFormat::Ron),
            _ => None,
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ManifestFormat::Toml => "toml",
            ManifestFormat::Ron => "ron",
        }
    }

    /// Parse a document. `path` is only used for error messages.
    pub fn parse<T: DeserializeOwned>(&self, text: &str, path: &Path) -> Result<T, ManifestError> {
        match self {
            ManifestFormat::Toml => {
                toml::from_str(text).map_err(|e| ManifestError::Parse(path.to_path_buf(), e.to_string()))
            }
            ManifestFormat::Ron => {
                ron::from_str(text).map_err(|e| ManifestError::Parse(path.to_path_buf(), e.to_string()))
            }
        }
    }
}

/// Read and parse a manifest file, picking the format from its extension
pub fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    let format = ManifestFormat::from_path(path)
        .ok_or_else(|| ManifestError::UnsupportedFormat(path.to_path_buf()))?;
    let text = std::fs::read_to_string(path).map_err(|e| ManifestError::Io(path.to_path_buf(), e))?;
    format.parse(&text, path)
}
