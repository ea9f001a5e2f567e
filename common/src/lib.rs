use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod buffer3;
pub mod file_format;
pub mod log_setup;

pub use file_format::{FileFormat, FileFormatError, FileFormatResult};

#[derive(Debug, thiserror::Error)]
pub enum SerdeFormatError {
    #[error("YAML serialization failed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),
}

pub type SerdeFormatResult<T> = Result<T, SerdeFormatError>;

/// Failure to read a parameter file from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] FileFormatError),
    #[error("Failed to read {path:?}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path:?}")]
    Parse {
        path: String,
        #[source]
        source: SerdeFormatError,
    },
}

pub fn serialize<T: Serialize>(value: &T, format: FileFormat) -> SerdeFormatResult<String> {
    let text = match format {
        FileFormat::Yaml => serde_yml::to_string(value)?,
        FileFormat::Json => serde_json::to_string_pretty(value)?,
    };
    Ok(text)
}

pub fn deserialize<T: DeserializeOwned + 'static>(
    serialized: &str,
    format: FileFormat,
) -> SerdeFormatResult<T> {
    match format {
        FileFormat::Yaml => Ok(serde_yml::from_str(serialized)?),
        FileFormat::Json => Ok(serde_json::from_str(serialized)?),
    }
}

/// Read a YAML or JSON file, choosing the format from its extension.
pub fn load_from_file<T: DeserializeOwned + 'static>(
    path: impl AsRef<Path>,
) -> Result<T, LoadError> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: shown.clone(),
        source,
    })?;
    let value = deserialize(&text, format).map_err(|source| LoadError::Parse {
        path: shown.clone(),
        source,
    })?;
    tracing::debug!(path = %shown, ?format, "Loaded parameter file");
    Ok(value)
}
