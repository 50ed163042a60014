use thiserror::Error;

use crate::core::error::AppError;

/// File-level failures that abort an import before any row is stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("File is too large: the maximum import size is {} MiB", .limit / (1024 * 1024))]
    FileTooLarge { limit: usize },

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("Malformed file: {0}")]
    MalformedFile(String),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        let message = err.to_string();
        match err {
            TransferError::FileTooLarge { .. } => AppError::PayloadTooLarge(message),
            TransferError::InvalidFileType(_) => AppError::UnsupportedMediaType(message),
            TransferError::MalformedFile(_) => AppError::BadRequest(message),
        }
    }
}
