//! Persistence layer for saving/loading index artifacts.
//!
//! Supports both JSON (human-readable) and bincode (efficient binary)
//! formats. Loading always re-checks the artifact's structural invariants,
//! so a tampered or truncated file surfaces as a corrupt-artifact error
//! instead of failing later inside retrieval.

use crate::error::{Error, Result};
use crate::tree::IndexArtifact;
use std::fs;
use std::path::Path;

/// Default filename for a stored artifact.
pub const DEFAULT_ARTIFACT_FILENAME: &str = "index_artifact.json";

/// Save format for index artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// JSON format (human-readable, larger).
    Json,
    /// Bincode format (binary, compact).
    Bincode,
}

impl SaveFormat {
    /// Determine format from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json, // Default to JSON
        }
    }
}

/// Save an artifact to a file, picking the format from the extension.
pub fn save_artifact(artifact: &IndexArtifact, path: &Path) -> Result<()> {
    let format = SaveFormat::from_path(path);
    save_artifact_with_format(artifact, path, format)
}

/// Save an artifact with a specific format.
pub fn save_artifact_with_format(
    artifact: &IndexArtifact,
    path: &Path,
    format: SaveFormat,
) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => artifact
            .to_json()
            .map_err(|e| Error::Serialization(e.to_string()))?
            .into_bytes(),
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            bincode::encode_to_vec(artifact, config)
                .map_err(|e| Error::Serialization(e.to_string()))?
        }
    };

    fs::write(path, &data).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Load an artifact from a file, picking the format from the extension.
pub fn load_artifact(path: &Path) -> Result<IndexArtifact> {
    if !path.exists() {
        return Err(Error::IndexNotFound(path.to_path_buf()));
    }

    let format = SaveFormat::from_path(path);
    load_artifact_with_format(path, format)
}

/// Load an artifact with a specific format.
pub fn load_artifact_with_format(path: &Path, format: SaveFormat) -> Result<IndexArtifact> {
    let data = fs::read(path).map_err(|e| Error::io(path, e))?;

    let artifact = match format {
        SaveFormat::Json => {
            let json_str =
                String::from_utf8(data).map_err(|e| Error::Serialization(e.to_string()))?;
            IndexArtifact::from_json(&json_str)
                .map_err(|e| Error::Serialization(e.to_string()))?
        }
        SaveFormat::Bincode => {
            let config = bincode::config::standard();
            let (artifact, _): (IndexArtifact, usize) = bincode::decode_from_slice(&data, config)
                .map_err(|e| Error::Serialization(e.to_string()))?;
            artifact
        }
    };

    artifact.validate()?;
    Ok(artifact)
}

/// Check if an artifact file exists at the given path.
pub fn artifact_exists(path: &Path) -> bool {
    path.exists() && path.is_file()
}

/// Get the size of an artifact file in bytes.
pub fn artifact_size(path: &Path) -> Result<u64> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok(metadata.len())
}
