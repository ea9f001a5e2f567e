use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum FileFormatError {
    #[error("Parameter file {0:?} has no extension")]
    MissingExtension(String),
    #[error("Unsupported parameter file extension {extension:?} in {path:?}")]
    UnsupportedExtension { path: String, extension: String },
}

pub type FileFormatResult<T> = Result<T, FileFormatError>;

/// Text formats accepted for parameter files.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect the format from the file extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> FileFormatResult<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| FileFormatError::MissingExtension(path.display().to_string()))?;

        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(FileFormatError::UnsupportedExtension {
                path: path.display().to_string(),
                extension: extension.to_string(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}
