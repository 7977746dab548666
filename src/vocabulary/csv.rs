//! Vocabulary corpus CSV parsing and validation
//!
//! Expected format: UTF-8, three columns `maori,english,description`, with an
//! optional header row detected by keyword. Validation is all-or-nothing: any
//! bad row rejects the whole batch so persistent state is never touched.

use crate::models::Vocabulary;

/// Maximum characters for the `maori` and `english` fields
const MAX_WORD_LEN: usize = 200;
/// Maximum characters for the `description` field
const MAX_DESCRIPTION_LEN: usize = 1000;

const HEADER_KEYWORDS: [&str; 4] = ["maori", "māori", "english", "description"];

/// Errors from corpus CSV ingestion
#[derive(thiserror::Error, Debug)]
pub enum CsvError {
    #[error("CSV file is empty")]
    Empty,

    #[error("CSV file only contains a header row, no data rows")]
    HeaderOnly,

    #[error("CSV validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
}

/// Parse and validate a vocabulary CSV body.
///
/// Returns the full batch of corpus entries, or an error describing every
/// offending row. No partial batches are ever produced.
pub fn parse_vocabulary_csv(content: &str) -> Result<Vec<Vocabulary>, CsvError> {
    let records = parse_records(content);
    if records.is_empty() {
        return Err(CsvError::Empty);
    }

    let start_row = if is_header_row(&records[0]) { 1 } else { 0 };
    if records.len() <= start_row {
        return Err(CsvError::HeaderOnly);
    }

    let mut vocabularies = Vec::new();
    let mut errors = Vec::new();
    // Māori head-words already seen, mapped to their first row number
    let mut seen = std::collections::HashMap::new();

    for (offset, record) in records[start_row..].iter().enumerate() {
        let row_num = start_row + offset + 1;

        if record.len() < 3 {
            errors.push(format!(
                "row {}: insufficient columns (expected 3, got {})",
                row_num,
                record.len()
            ));
            continue;
        }

        let maori = record[0].trim();
        let english = record[1].trim();
        let description = record[2].trim();

        if maori.is_empty() {
            errors.push(format!("row {}: Māori field is required", row_num));
            continue;
        }
        if english.is_empty() {
            errors.push(format!("row {}: English field is required", row_num));
            continue;
        }
        if description.is_empty() {
            errors.push(format!("row {}: description field is required", row_num));
            continue;
        }

        if maori.chars().count() > MAX_WORD_LEN {
            errors.push(format!("row {}: Māori field exceeds {} characters", row_num, MAX_WORD_LEN));
            continue;
        }
        if english.chars().count() > MAX_WORD_LEN {
            errors.push(format!("row {}: English field exceeds {} characters", row_num, MAX_WORD_LEN));
            continue;
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(format!(
                "row {}: description field exceeds {} characters",
                row_num, MAX_DESCRIPTION_LEN
            ));
            continue;
        }

        if let Some(first_row) = seen.insert(maori.to_string(), row_num) {
            errors.push(format!(
                "row {}: duplicate Māori word '{}' (first seen in row {})",
                row_num, maori, first_row
            ));
            continue;
        }

        vocabularies.push(Vocabulary::new(
            maori.to_string(),
            english.to_string(),
            description.to_string(),
        ));
    }

    if !errors.is_empty() {
        return Err(CsvError::Validation(errors));
    }

    Ok(vocabularies)
}

/// Whether a row looks like the column-name header
fn is_header_row(row: &[String]) -> bool {
    row.iter().take(3).any(|field| {
        let field = field.trim().to_lowercase();
        HEADER_KEYWORDS.contains(&field.as_str())
    })
}

/// Split CSV text into records of fields, honouring double-quoted fields
/// with `""` escapes. Blank lines are skipped.
fn parse_records(content: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                if !(record.len() == 1 && record[0].trim().is_empty()) {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Final record without trailing newline
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        if !(record.len() == 1 && record[0].trim().is_empty()) {
            records.push(record);
        }
    }

    records
}
