use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    /// Rejected caller input; displays only the message
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Library(#[from] core_library::LibraryError),

    #[error(transparent)]
    Metadata(#[from] core_metadata::MetadataError),
}

impl CoreError {
    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than a
    /// collaborator failure
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Library(core_library::LibraryError::InvalidInput { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
