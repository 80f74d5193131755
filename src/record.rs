//! Case-study record schema, validation, and tag parsing.
//!
//! A [`CaseStudyRecord`] is the unit of work and the unit of validation: only
//! records that pass [`validate`] enter the accepted set surfaced to the table,
//! the retriever, and the answer pipeline. Validation failures are data, never
//! panics; the only hard failure is structurally malformed input caught by
//! [`validate_value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Minimum summary length for a record to be considered non-trivial.
pub const MIN_SUMMARY_CHARS: usize = 30;
/// Minimum length of the raw category/domain/technologies string.
pub const MIN_TAGS_CHARS: usize = 10;
/// Minimum extracted-text length, filtering out near-empty extractions.
pub const MIN_FULL_TEXT_CHARS: usize = 100;

/// Sentinel used when a tag line is missing from the categorizer output.
const UNKNOWN: &str = "Unknown";

/// Validated unit of output per ingested document.
///
/// This exact four-field mapping is the interchange schema: the validator
/// enforces it and any persistence layer must round-trip it without loss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaseStudyRecord {
    /// Document identifier (file name).
    pub file: String,
    /// Generated natural-language summary.
    pub summary: String,
    /// Raw three-line category/domain/technologies string from the classifier.
    pub category_domain_tech: String,
    /// Full extracted text of the document.
    pub full_text: String,
}

/// One failed constraint, naming the offending field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldIssue {
    /// Record field that failed the check.
    pub field: String,
    /// Human-readable reason for the failure.
    pub reason: String,
}

/// Outcome of validating a candidate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the record may enter the accepted set.
    pub valid: bool,
    /// Per-field diagnostics; non-empty whenever `valid` is false.
    pub issues: Vec<FieldIssue>,
}

/// Candidate record carried the right field names but the wrong types.
///
/// This indicates a pipeline-assembly bug rather than bad document content, so
/// it is allowed to propagate as a hard failure.
#[derive(Debug, Error)]
#[error("Malformed candidate record: field '{field}' {reason}")]
pub struct InputShapeError {
    /// Offending field, or the record itself.
    pub field: String,
    /// What was wrong with its shape.
    pub reason: String,
}

/// Parsed (category, domain, technologies) triple.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagTriple {
    /// Document category (case study, research, tutorial, ...).
    pub category: String,
    /// Business domain (finance, healthcare, ...).
    pub domain: String,
    /// Comma-separated technology list.
    pub technologies: String,
}

/// Validate a candidate record against the schema and length constraints.
///
/// Pure function: no I/O, no panics. Every failing field is reported.
pub fn validate(record: &CaseStudyRecord) -> ValidationReport {
    let mut issues = Vec::new();

    if record.file.trim().is_empty() {
        issues.push(FieldIssue {
            field: "file".into(),
            reason: "must be a non-empty file name".into(),
        });
    }
    check_min_length(&mut issues, "summary", &record.summary, MIN_SUMMARY_CHARS);
    check_min_length(
        &mut issues,
        "category_domain_tech",
        &record.category_domain_tech,
        MIN_TAGS_CHARS,
    );
    check_min_length(&mut issues, "full_text", &record.full_text, MIN_FULL_TEXT_CHARS);

    ValidationReport {
        valid: issues.is_empty(),
        issues,
    }
}

/// Validate an untyped candidate mapping, enforcing the field shapes first.
///
/// Missing fields are validation failures (reported as data); fields with the
/// wrong *type*, or a candidate that is not an object at all, fail hard with
/// [`InputShapeError`].
pub fn validate_value(candidate: &Value) -> Result<ValidationReport, InputShapeError> {
    let Some(map) = candidate.as_object() else {
        return Err(InputShapeError {
            field: "record".into(),
            reason: "is not an object".into(),
        });
    };

    let mut issues = Vec::new();
    let mut fields = [("file", None), ("summary", None), ("category_domain_tech", None), ("full_text", None)];

    for (name, slot) in &mut fields {
        match map.get(*name) {
            None => issues.push(FieldIssue {
                field: (*name).into(),
                reason: "field is missing".into(),
            }),
            Some(Value::String(text)) => *slot = Some(text.clone()),
            Some(other) => {
                return Err(InputShapeError {
                    field: (*name).into(),
                    reason: format!("expected a string, got {}", type_name(other)),
                });
            }
        }
    }

    if !issues.is_empty() {
        return Ok(ValidationReport {
            valid: false,
            issues,
        });
    }

    let [file, summary, category_domain_tech, full_text] =
        fields.map(|(_, value)| value.unwrap_or_default());
    Ok(validate(&CaseStudyRecord {
        file,
        summary,
        category_domain_tech,
        full_text,
    }))
}

/// Best-effort parse of the classifier's three labeled lines.
///
/// Tolerant by contract: any missing or unparseable line yields `"Unknown"`
/// for that slot. Never fails.
pub fn parse_tags(raw: &str) -> TagTriple {
    let mut category = String::new();
    let mut domain = String::new();
    let mut technologies = String::new();

    for line in raw.lines() {
        let lower = line.to_lowercase();
        let value = || {
            line.split_once(':')
                .map(|(_, rest)| rest.trim().to_string())
                .unwrap_or_default()
        };
        if lower.starts_with("1. category") {
            category = value();
        } else if lower.starts_with("2. domain") {
            domain = value();
        } else if lower.starts_with("3. technologies") {
            technologies = value();
        }
    }

    TagTriple {
        category: or_unknown(category),
        domain: or_unknown(domain),
        technologies: or_unknown(technologies),
    }
}

fn or_unknown(value: String) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

fn check_min_length(issues: &mut Vec<FieldIssue>, field: &str, value: &str, min: usize) {
    if value.chars().count() < min {
        issues.push(FieldIssue {
            field: field.into(),
            reason: format!("must be at least {min} characters"),
        });
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
