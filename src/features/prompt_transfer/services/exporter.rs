use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::core::error::{AppError, Result};
use crate::features::prompt_transfer::models::TransferFormat;
use crate::features::prompts::models::Prompt;
use crate::shared::csv::push_record;

const CSV_HEADER: [&str; 8] = [
    "name",
    "prompt_text",
    "description",
    "model",
    "tags",
    "is_public",
    "inserted_at",
    "updated_at",
];

/// A serialized export ready to be sent as a download
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
    pub record_count: usize,
}

#[derive(Debug, Serialize)]
struct ExportedPrompt<'a> {
    name: &'a str,
    prompt_text: &'a str,
    description: Option<&'a str>,
    model: &'a str,
    tags: &'a [String],
    is_public: bool,
    inserted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Prompt> for ExportedPrompt<'a> {
    fn from(p: &'a Prompt) -> Self {
        Self {
            name: &p.name,
            prompt_text: &p.prompt_text,
            description: p.description.as_deref(),
            model: &p.model,
            tags: &p.tags,
            is_public: p.is_public,
            inserted_at: p.inserted_at,
            updated_at: p.updated_at,
        }
    }
}

/// `prompts-export-2025-06-01.csv`
pub fn export_file_name(format: TransferFormat, date: NaiveDate) -> String {
    format!(
        "prompts-export-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Serialize `prompts` in the given order.
pub fn export_prompts(
    prompts: &[Prompt],
    format: TransferFormat,
    date: NaiveDate,
) -> Result<ExportFile> {
    let bytes = match format {
        TransferFormat::Csv => to_csv(prompts).into_bytes(),
        TransferFormat::Json => to_json(prompts)?,
    };

    Ok(ExportFile {
        bytes,
        content_type: format.mime_type(),
        file_name: export_file_name(format, date),
        record_count: prompts.len(),
    })
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn to_csv(prompts: &[Prompt]) -> String {
    let mut out = String::new();
    push_record(&mut out, &CSV_HEADER);

    for p in prompts {
        push_record(
            &mut out,
            &[
                p.name.clone(),
                p.prompt_text.clone(),
                p.description.clone().unwrap_or_default(),
                p.model.clone(),
                p.tags.join(","),
                p.is_public.to_string(),
                timestamp(&p.inserted_at),
                timestamp(&p.updated_at),
            ],
        );
    }

    out
}

fn to_json(prompts: &[Prompt]) -> Result<Vec<u8>> {
    let rows: Vec<ExportedPrompt<'_>> = prompts.iter().map(ExportedPrompt::from).collect();
    serde_json::to_vec_pretty(&rows)
        .map_err(|e| AppError::Internal(format!("Failed to serialize export: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::csv::read_records;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn prompt(name: &str, prompt_text: &str, description: Option<&str>, tags: &[&str]) -> Prompt {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        Prompt {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            team_id: None,
            name: name.to_string(),
            prompt_text: prompt_text.to_string(),
            description: description.map(str::to_string),
            model: "gpt-4o".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_public: true,
            inserted_at: at,
            updated_at: at,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn test_file_name_contains_date_and_extension() {
        assert_eq!(
            export_file_name(TransferFormat::Csv, date()),
            "prompts-export-2025-06-02.csv"
        );
        assert_eq!(
            export_file_name(TransferFormat::Json, date()),
            "prompts-export-2025-06-02.json"
        );
    }

    #[test]
    fn test_csv_export_quotes_and_joins_tags() {
        let prompts = vec![prompt(
            "Reply, politely",
            "Say \"thanks\"\nthen sign off",
            None,
            &["email", "support"],
        )];
        let file = export_prompts(&prompts, TransferFormat::Csv, date()).unwrap();
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
        assert_eq!(file.record_count, 1);

        let text = String::from_utf8(file.bytes).unwrap();
        assert!(text.starts_with(
            "name,prompt_text,description,model,tags,is_public,inserted_at,updated_at\n"
        ));

        let records = read_records(&text).unwrap();
        assert_eq!(
            records[1],
            vec![
                "Reply, politely",
                "Say \"thanks\"\nthen sign off",
                "",
                "gpt-4o",
                "email,support",
                "true",
                "2025-06-01T09:30:00Z",
                "2025-06-01T09:30:00Z",
            ]
        );
    }

    #[test]
    fn test_json_export_is_array_with_timestamps() {
        let prompts = vec![
            prompt("A", "first", Some("desc"), &["x", "x"]),
            prompt("B", "second", None, &[]),
        ];
        let file = export_prompts(&prompts, TransferFormat::Json, date()).unwrap();
        assert_eq!(file.content_type, "application/json");

        let value: serde_json::Value = serde_json::from_slice(&file.bytes).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "A");
        assert_eq!(rows[0]["tags"], serde_json::json!(["x", "x"]));
        assert_eq!(rows[0]["inserted_at"], "2025-06-01T09:30:00Z");
        assert_eq!(rows[1]["description"], serde_json::Value::Null);
        assert_eq!(rows[1]["is_public"], true);
    }

    #[test]
    fn test_empty_export_still_has_csv_header() {
        let file = export_prompts(&[], TransferFormat::Csv, date()).unwrap();
        assert_eq!(file.record_count, 0);
        assert_eq!(read_records(std::str::from_utf8(&file.bytes).unwrap()).unwrap().len(), 1);

        let json = export_prompts(&[], TransferFormat::Json, date()).unwrap();
        assert_eq!(json.bytes, b"[]");
    }
}
