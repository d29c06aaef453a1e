//! Input validation shared by every catalog facade.
//!
//! Static per-field rules are declared on transfer objects with the
//! `validator` derive and run through [`validate_input`]. Rules that need the
//! clock or span several fields are plain functions returning [`CoreError`].

use chrono::Datelike;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Named constants
-------------------------------------------------------------------------- */

/// Earliest release year accepted for movies and seasons.
pub const MIN_YEAR: i32 = 1930;

/// Language codes (ISO 639-1) accepted for audio, subtitles and books.
pub const LANGUAGE_CODES: &[&str] = &[
    "cs", "de", "en", "es", "fr", "it", "ja", "pl", "ru", "sk",
];

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Run the derived rules of a transfer object.
///
/// All violations are reported together, sorted by field path.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(|errors| {
        let mut messages = Vec::new();
        collect_messages("", &errors, &mut messages);
        messages.sort();
        CoreError::Validation(messages.join("; "))
    })
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let detail = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), |m| m.to_string());
                    out.push(format!("{path}: {detail}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

/// Ids taken from the request path must be positive.
pub fn validate_id(id: DbId) -> Result<(), CoreError> {
    if id <= 0 {
        return Err(CoreError::InvalidArgument(format!(
            "id must be a positive integer (got {id})"
        )));
    }
    Ok(())
}

/// Validate that `year` lies between [`MIN_YEAR`] and the current year.
pub fn validate_year(field: &str, year: i32) -> Result<(), CoreError> {
    let current = chrono::Utc::now().year();
    if !(MIN_YEAR..=current).contains(&year) {
        return Err(CoreError::Validation(format!(
            "{field}: must be between {MIN_YEAR} and {current} (got {year})"
        )));
    }
    Ok(())
}

/// Validate that a season does not end before it starts.
pub fn validate_year_range(start_year: i32, end_year: i32) -> Result<(), CoreError> {
    validate_year("start_year", start_year)?;
    validate_year("end_year", end_year)?;
    if start_year > end_year {
        return Err(CoreError::Validation(format!(
            "start_year ({start_year}) must not be after end_year ({end_year})"
        )));
    }
    Ok(())
}

/// Validate a single language code.
pub fn validate_language(field: &str, code: &str) -> Result<(), CoreError> {
    if LANGUAGE_CODES.contains(&code) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{field}: unknown language '{code}'. Valid languages: {}",
            LANGUAGE_CODES.join(", ")
        )))
    }
}

/// Validate a list of language codes; `required` rejects an empty list.
pub fn validate_languages(field: &str, codes: &[String], required: bool) -> Result<(), CoreError> {
    if required && codes.is_empty() {
        return Err(CoreError::Validation(format!(
            "{field}: at least one language is required"
        )));
    }
    for code in codes {
        validate_language(field, code)?;
    }
    if has_duplicates(codes) {
        return Err(CoreError::Validation(format!(
            "{field}: languages must not repeat"
        )));
    }
    Ok(())
}

/// Validate that a reference list does not name the same id twice.
pub fn validate_distinct_ids(field: &str, ids: &[DbId]) -> Result<(), CoreError> {
    for &id in ids {
        validate_id(id).map_err(|_| {
            CoreError::Validation(format!("{field}: ids must be positive (got {id})"))
        })?;
    }
    if has_duplicates(ids) {
        return Err(CoreError::Validation(format!(
            "{field}: ids must not repeat"
        )));
    }
    Ok(())
}

fn has_duplicates<T: Ord>(items: &[T]) -> bool {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort();
    sorted.windows(2).any(|w| w[0] == w[1])
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
