use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::features::prompt_transfer::error::TransferError;

/// File format for bulk import and export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferFormat {
    Csv,
    #[default]
    Json,
}

impl TransferFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TransferFormat::Csv => "csv",
            TransferFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TransferFormat::Csv => "text/csv; charset=utf-8",
            TransferFormat::Json => "application/json",
        }
    }

    /// Format implied by a file name's extension, if recognised
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        extension.parse().ok()
    }

    /// Format implied by a content type; generic types imply nothing
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/csv" | "application/csv" | "text/comma-separated-values" => {
                Some(TransferFormat::Csv)
            }
            "application/json" | "text/json" => Some(TransferFormat::Json),
            _ => None,
        }
    }
}

impl FromStr for TransferFormat {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(TransferFormat::Csv),
            "json" => Ok(TransferFormat::Json),
            other => Err(TransferError::InvalidFileType(format!(
                "unsupported format '{}', expected csv or json",
                other
            ))),
        }
    }
}

impl fmt::Display for TransferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Decide the format of an upload and check that its name and content type agree.
pub fn resolve_format(
    declared: Option<TransferFormat>,
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<TransferFormat, TransferError> {
    let by_name = file_name.and_then(TransferFormat::from_file_name);
    let by_type = content_type.and_then(TransferFormat::from_content_type);

    let format = declared
        .or(by_name)
        .or(by_type)
        .ok_or_else(|| {
            TransferError::InvalidFileType(
                "cannot tell whether the file is CSV or JSON; upload a .csv or .json file"
                    .to_string(),
            )
        })?;

    if let Some(actual) = by_name {
        if actual != format {
            return Err(TransferError::InvalidFileType(format!(
                "file extension is .{} but the declared format is {}",
                actual, format
            )));
        }
    }

    if let Some(actual) = by_type {
        if actual != format {
            return Err(TransferError::InvalidFileType(format!(
                "content type is {} but the declared format is {}",
                content_type.unwrap_or_default(),
                format
            )));
        }
    }

    Ok(format)
}
