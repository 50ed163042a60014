use serde_json::{Map, Value};

use crate::features::prompt_transfer::error::TransferError;
use crate::features::prompt_transfer::models::{
    resolve_format, ImportIssue, IssueLog, ParseOutcome, TransferFormat,
};
use crate::features::prompts::models::PromptRecord;
use crate::shared::constants::{
    DEFAULT_MODEL, MAX_MODEL_LENGTH, MAX_NAME_LENGTH, MAX_PROMPT_TEXT_LENGTH, MAX_TAGS,
};
use crate::shared::csv::read_records;
use crate::shared::validation::{clean_tags, split_tags, strip_nul, truncate_chars};

/// An uploaded file as received from the client
#[derive(Debug, Clone, Default)]
pub struct ImportFile {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    /// Format the client asked for, if any
    pub declared_format: Option<TransferFormat>,
}

/// Canonical prompt fields an input column or key can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    PromptText,
    Description,
    Model,
    Tags,
    IsPublic,
}

impl Field {
    fn from_alias(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "name" | "title" | "prompt_name" => Some(Field::Name),
            "prompt_text" | "prompt" | "content" | "text" => Some(Field::PromptText),
            "description" | "desc" | "summary" => Some(Field::Description),
            "model" => Some(Field::Model),
            "tags" => Some(Field::Tags),
            "is_public" => Some(Field::IsPublic),
            _ => None,
        }
    }
}

/// Field values of one input row after alias resolution, before cleanup.
#[derive(Debug, Default)]
struct RawRow {
    name: Option<String>,
    prompt_text: Option<String>,
    description: Option<String>,
    model: Option<String>,
    tags: Option<Vec<String>>,
}

impl RawRow {
    /// Offer a textual value; the first non-empty value of a field wins.
    fn offer_text(&mut self, field: Field, value: String) {
        // Postgres text columns reject NUL
        let value = strip_nul(value);
        if value.trim().is_empty() {
            return;
        }

        let slot = match field {
            Field::Name => &mut self.name,
            Field::PromptText => &mut self.prompt_text,
            Field::Description => &mut self.description,
            Field::Model => &mut self.model,
            Field::Tags => return self.offer_tags(split_tags(&value)),
            // Visibility is never taken from an import file
            Field::IsPublic => return,
        };

        if slot.is_none() {
            *slot = Some(value);
        }
    }

    fn offer_tags(&mut self, tags: Vec<String>) {
        if self.tags.is_none() && !tags.is_empty() {
            self.tags = Some(tags);
        }
    }

    /// Apply the import rules and produce a storable record, or the reason
    /// the row cannot be stored.
    fn normalize(self) -> Result<PromptRecord, String> {
        let name = trimmed_to(self.name, MAX_NAME_LENGTH).unwrap_or_default();
        let prompt_text = trimmed_to(self.prompt_text, MAX_PROMPT_TEXT_LENGTH).unwrap_or_default();

        match (name.is_empty(), prompt_text.is_empty()) {
            (true, true) => return Err("missing name and prompt_text".to_string()),
            (true, false) => return Err("missing name".to_string()),
            (false, true) => return Err("missing prompt_text".to_string()),
            (false, false) => {}
        }

        let model = trimmed_to(self.model, MAX_MODEL_LENGTH)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut tags = clean_tags(self.tags.unwrap_or_default());
        tags.truncate(MAX_TAGS);

        Ok(PromptRecord {
            name,
            prompt_text,
            description: trimmed(self.description),
            model,
            tags,
            is_public: false,
        })
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`trimmed`], but cut to `max_chars` and trimmed again so the cut
/// never leaves trailing whitespace.
fn trimmed_to(value: Option<String>, max_chars: usize) -> Option<String> {
    let mut value = trimmed(value)?;
    if truncate_chars(&mut value, max_chars) {
        let kept = value.trim_end().len();
        value.truncate(kept);
    }
    Some(value)
}

/// Turns CSV or JSON uploads into candidate prompt records.
///
/// Only file-level problems are errors; bad rows are counted and reported
/// in the returned [`ParseOutcome`].
#[derive(Debug, Clone)]
pub struct ImportParser {
    max_file_size: usize,
}

impl ImportParser {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn parse(&self, file: &ImportFile) -> Result<ParseOutcome, TransferError> {
        if file.bytes.len() > self.max_file_size {
            return Err(TransferError::FileTooLarge {
                limit: self.max_file_size,
            });
        }

        let format = resolve_format(
            file.declared_format,
            file.file_name.as_deref(),
            file.content_type.as_deref(),
        )?;

        let text = decode_utf8(&file.bytes)?;
        let rows = match format {
            TransferFormat::Csv => csv_rows(text)?,
            TransferFormat::Json => json_rows(text)?,
        };

        Ok(collect_candidates(rows))
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<&str, TransferError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        TransferError::MalformedFile(format!(
            "file is not valid UTF-8 (invalid byte at offset {})",
            e.valid_up_to()
        ))
    })?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn csv_rows(text: &str) -> Result<Vec<Result<RawRow, String>>, TransferError> {
    let mut records = read_records(text)
        .map_err(|e| TransferError::MalformedFile(e.to_string()))?
        .into_iter();

    let header = records
        .next()
        .ok_or_else(|| TransferError::MalformedFile("file is empty".to_string()))?;
    let columns: Vec<Option<Field>> = header.iter().map(|h| Field::from_alias(h)).collect();

    for (required, aliases) in [
        (Field::Name, "name, title or prompt_name"),
        (Field::PromptText, "prompt_text, prompt, content or text"),
    ] {
        if !columns.contains(&Some(required)) {
            return Err(TransferError::MalformedFile(format!(
                "CSV header must contain one of: {}",
                aliases
            )));
        }
    }

    Ok(records
        .map(|record| {
            let mut row = RawRow::default();
            for (field, value) in columns.iter().zip(record) {
                if let Some(field) = field {
                    row.offer_text(*field, value);
                }
            }
            Ok(row)
        })
        .collect())
}

fn json_rows(text: &str) -> Result<Vec<Result<RawRow, String>>, TransferError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| TransferError::MalformedFile(format!("invalid JSON: {}", e)))?;

    let items = match document {
        Value::Array(items) => items,
        Value::Object(object) => vec![Value::Object(object)],
        _ => {
            return Err(TransferError::MalformedFile(
                "JSON must be an object or an array of objects".to_string(),
            ))
        }
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(object) => Ok(json_object_row(object)),
            _ => Err("row is not a JSON object".to_string()),
        })
        .collect())
}

fn json_object_row(object: Map<String, Value>) -> RawRow {
    let mut row = RawRow::default();
    for (key, value) in object {
        let Some(field) = Field::from_alias(&key) else {
            continue;
        };

        match (field, value) {
            (Field::Tags, Value::Array(items)) => {
                row.offer_tags(clean_tags(items.iter().filter_map(json_scalar_text)))
            }
            (field, value) => {
                if let Some(text) = json_scalar_text(&value) {
                    row.offer_text(field, text);
                }
            }
        }
    }
    row
}

/// Textual form of a JSON scalar; `null`, arrays and objects have none
fn json_scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn collect_candidates(rows: Vec<Result<RawRow, String>>) -> ParseOutcome {
    let mut outcome = ParseOutcome {
        total: rows.len(),
        ..Default::default()
    };
    let mut issues = IssueLog::default();

    for (index, row) in rows.into_iter().enumerate() {
        match row.and_then(RawRow::normalize) {
            Ok(record) => outcome.candidates.push(record),
            Err(reason) => {
                outcome.invalid_row_count += 1;
                issues.push(ImportIssue::invalid_row(index + 1, reason));
            }
        }
    }

    outcome.issues = issues;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::prompt_transfer::models::IssueKind;
    use crate::shared::constants::{MAX_IMPORT_FILE_SIZE, MAX_REPORTED_ISSUES};
    use tokio_test::{assert_err, assert_ok};

    fn parser() -> ImportParser {
        ImportParser::new(MAX_IMPORT_FILE_SIZE)
    }

    fn csv_file(body: &str) -> ImportFile {
        ImportFile {
            bytes: body.as_bytes().to_vec(),
            file_name: Some("prompts.csv".to_string()),
            content_type: Some("text/csv".to_string()),
            declared_format: Some(TransferFormat::Csv),
        }
    }

    fn json_file(body: &str) -> ImportFile {
        ImportFile {
            bytes: body.as_bytes().to_vec(),
            file_name: Some("prompts.json".to_string()),
            content_type: Some("application/json".to_string()),
            declared_format: Some(TransferFormat::Json),
        }
    }

    #[test]
    fn test_csv_happy_path() {
        let outcome = assert_ok!(parser().parse(&csv_file(
            "name,prompt_text\n\"Email Subject\",\"Write 5 subject lines\"",
        )));

        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.invalid_row_count, 0);
        assert_eq!(
            outcome.candidates,
            vec![PromptRecord {
                name: "Email Subject".to_string(),
                prompt_text: "Write 5 subject lines".to_string(),
                description: None,
                model: "gpt-4o".to_string(),
                tags: Vec::new(),
                is_public: false,
            }]
        );
    }

    #[test]
    fn test_csv_aliases_are_case_insensitive_and_unknown_columns_ignored() {
        let body = "\u{feff} Title ,CONTENT,Summary,Model,Tags,rating,Is_Public\n\
                    Blog intro,Write an intro,Short,claude-3,\"seo, blog seo\",5,true\n";
        let outcome = parser().parse(&csv_file(body)).unwrap();

        let record = &outcome.candidates[0];
        assert_eq!(record.name, "Blog intro");
        assert_eq!(record.prompt_text, "Write an intro");
        assert_eq!(record.description.as_deref(), Some("Short"));
        assert_eq!(record.model, "claude-3");
        assert_eq!(record.tags, vec!["seo", "blog", "seo"]);
        assert!(!record.is_public);
    }

    #[test]
    fn test_first_non_empty_alias_wins() {
        let body = "name,title,prompt,text\n,Fallback title,First text,Second text\n";
        let outcome = parser().parse(&csv_file(body)).unwrap();

        assert_eq!(outcome.candidates[0].name, "Fallback title");
        assert_eq!(outcome.candidates[0].prompt_text, "First text");
    }

    #[test]
    fn test_csv_invalid_rows_are_counted_with_row_numbers() {
        let body = "name,prompt_text,model\nGood,Text,\n  ,Text\nOnly name,   \n";
        let outcome = parser().parse(&csv_file(body)).unwrap();

        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].model, "gpt-4o");
        assert_eq!(outcome.invalid_row_count, 2);

        let issues = outcome.issues.into_vec();
        assert_eq!(issues[0], ImportIssue::invalid_row(2, "missing name"));
        assert_eq!(issues[1], ImportIssue::invalid_row(3, "missing prompt_text"));
        assert!(issues.iter().all(|i| i.kind == IssueKind::Validation));
    }

    #[test]
    fn test_csv_quoted_multiline_field_is_one_row() {
        let body = "name,prompt_text\r\nSteps,\"Line one\r\nLine \"\"two\"\"\"\r\n";
        let outcome = parser().parse(&csv_file(body)).unwrap();

        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.candidates[0].prompt_text, "Line one\r\nLine \"two\"");
    }

    #[test]
    fn test_csv_header_without_required_columns_is_malformed() {
        let err = parser()
            .parse(&csv_file("title,description\nA,B\n"))
            .unwrap_err();
        assert!(matches!(err, TransferError::MalformedFile(_)));
    }

    #[test]
    fn test_empty_csv_is_malformed() {
        let err = parser().parse(&csv_file("\n\n")).unwrap_err();
        assert_eq!(err, TransferError::MalformedFile("file is empty".to_string()));
    }

    #[test]
    fn test_csv_whitespace_lines_are_not_rows() {
        let outcome = parser()
            .parse(&csv_file("name,prompt_text\nA,B\n   \n\t\n"))
            .unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.invalid_row_count, 0);
    }

    #[test]
    fn test_csv_header_only_has_no_rows() {
        let outcome = parser().parse(&csv_file("name,prompt_text\n")).unwrap();
        assert_eq!(outcome.total, 0);
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = parser()
            .parse(&csv_file("name,prompt_text\n\"open,text\n"))
            .unwrap_err();
        assert!(matches!(err, TransferError::MalformedFile(_)));
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let mut file = csv_file("name,prompt_text\n");
        file.bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        let err = parser().parse(&file).unwrap_err();
        assert!(matches!(err, TransferError::MalformedFile(_)));
    }

    #[test]
    fn test_json_missing_prompt_text_is_invalid() {
        let outcome = parser().parse(&json_file(r#"[{"name":"X"}]"#)).unwrap();

        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.invalid_row_count, 1);
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_json_single_object_and_aliases() {
        let body = r#"{
            "prompt_name": "Summarize",
            "prompt": "Summarize this article",
            "desc": "",
            "summary": "Three bullet points",
            "tags": ["news", " ", "news", 42],
            "is_public": true
        }"#;
        let outcome = parser().parse(&json_file(body)).unwrap();

        let record = &outcome.candidates[0];
        assert_eq!(record.name, "Summarize");
        assert_eq!(record.description.as_deref(), Some("Three bullet points"));
        assert_eq!(record.tags, vec!["news", "news", "42"]);
        assert!(!record.is_public);
    }

    #[test]
    fn test_json_scalars_are_stringified_and_null_is_absent() {
        let body = r#"[{"name": 2024, "text": true, "model": null, "tags": "a b,c"}]"#;
        let outcome = parser().parse(&json_file(body)).unwrap();

        let record = &outcome.candidates[0];
        assert_eq!(record.name, "2024");
        assert_eq!(record.prompt_text, "true");
        assert_eq!(record.model, "gpt-4o");
        assert_eq!(record.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_json_non_object_elements_are_invalid_rows() {
        let body = r#"[{"name":"A","prompt_text":"B"}, "oops", 7, null]"#;
        let outcome = parser().parse(&json_file(body)).unwrap();

        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.invalid_row_count, 3);
        assert_eq!(
            outcome.issues.into_vec()[0],
            ImportIssue::invalid_row(2, "row is not a JSON object")
        );
    }

    #[test]
    fn test_json_syntax_and_shape_errors_are_malformed() {
        for body in ["[{\"name\": ", "\"just a string\"", "42"] {
            let err = parser().parse(&json_file(body)).unwrap_err();
            assert!(matches!(err, TransferError::MalformedFile(_)), "{}", body);
        }
    }

    #[test]
    fn test_long_fields_are_truncated_not_rejected() {
        let body = serde_json::json!([{
            "name": "n".repeat(MAX_NAME_LENGTH + 5),
            "prompt_text": "é".repeat(MAX_PROMPT_TEXT_LENGTH + 1),
        }])
        .to_string();
        let outcome = parser().parse(&json_file(&body)).unwrap();

        let record = &outcome.candidates[0];
        assert_eq!(record.name.chars().count(), MAX_NAME_LENGTH);
        assert_eq!(record.prompt_text.chars().count(), MAX_PROMPT_TEXT_LENGTH);
    }

    #[test]
    fn test_nul_characters_are_dropped_from_fields_and_tags() {
        let body = r#"[{
            "name": "Nul\u0000name",
            "prompt_text": "x\u0000y",
            "description": "\u0000",
            "tags": ["ok\u0000", "\u0000"]
        }]"#;
        let outcome = parser().parse(&json_file(body)).unwrap();

        assert_eq!(outcome.invalid_row_count, 0);
        let record = &outcome.candidates[0];
        assert_eq!(record.name, "Nulname");
        assert_eq!(record.prompt_text, "xy");
        assert_eq!(record.description, None);
        assert_eq!(record.tags, vec!["ok"]);
    }

    #[test]
    fn test_csv_field_of_only_nul_counts_as_missing() {
        let outcome = parser()
            .parse(&csv_file("name,prompt_text,tags\nA,\0,\"a\0b, \0\"\n"))
            .unwrap();

        assert_eq!(outcome.total, 1);
        assert_eq!(
            outcome.issues.into_vec()[0],
            ImportIssue::invalid_row(1, "missing prompt_text")
        );
    }

    #[test]
    fn test_truncated_name_has_no_trailing_whitespace() {
        let name = format!("{} tail", "n".repeat(MAX_NAME_LENGTH - 1));
        let body = serde_json::json!([{ "name": name, "prompt_text": "text" }]).to_string();
        let outcome = parser().parse(&json_file(&body)).unwrap();

        let record = &outcome.candidates[0];
        assert_eq!(record.name, "n".repeat(MAX_NAME_LENGTH - 1));
    }

    #[test]
    fn test_issues_are_capped_but_count_is_not() {
        let mut body = String::from("name,prompt_text\n");
        for _ in 0..MAX_REPORTED_ISSUES + 20 {
            body.push_str(",missing name\n");
        }
        let outcome = parser().parse(&csv_file(&body)).unwrap();

        assert_eq!(outcome.invalid_row_count, MAX_REPORTED_ISSUES + 20);
        assert_eq!(outcome.issues.len(), MAX_REPORTED_ISSUES);
    }

    #[test]
    fn test_size_is_checked_before_format() {
        let file = ImportFile {
            bytes: vec![b'x'; 11 * 1024 * 1024],
            file_name: Some("huge.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            declared_format: None,
        };
        let err = assert_err!(parser().parse(&file));
        assert_eq!(
            err,
            TransferError::FileTooLarge {
                limit: MAX_IMPORT_FILE_SIZE
            }
        );
    }

    #[test]
    fn test_declared_format_must_match_extension() {
        let mut file = csv_file("name,prompt_text\nA,B\n");
        file.declared_format = Some(TransferFormat::Json);
        let err = parser().parse(&file).unwrap_err();
        assert!(matches!(err, TransferError::InvalidFileType(_)));
    }
}
