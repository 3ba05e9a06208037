use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One form control as extracted from the live page. Re-derived on every
/// extraction pass; never persisted directly (only the stripped
/// [`FieldShape`] survives into the template cache).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub selector: String,
    pub label: String,
    /// Control type as reported by the extractor, e.g. "text", "select",
    /// "textarea", "contenteditable".
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Structural description of a field without any generated value. This is
/// the only field representation the template cache accepts, so runtime
/// attributes (suggested values, confidence, notes) cannot leak into
/// persistence by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldShape {
    pub selector: String,
    pub label: String,
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<FormField> for FieldShape {
    fn from(field: FormField) -> Self {
        Self {
            selector: field.selector,
            label: field.label,
            field_type: field.field_type,
            options: field.options,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

/// A suggested value for one field, produced by the value-generation
/// collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAnswer {
    pub selector: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FieldAnswer {
    /// Answers without a usable value are never sent to the executor and do
    /// not count toward the totals shown to the user.
    pub fn has_value(&self) -> bool {
        self.suggested_value
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    Filled,
    NotFound,
    Error,
}

impl FillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FillStatus::Filled => "filled",
            FillStatus::NotFound => "not_found",
            FillStatus::Error => "error",
        }
    }
}

/// Per-field outcome of one executor pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFillResult {
    pub selector: String,
    pub label: String,
    pub status: FillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aggregate result of one executor pass over a set of assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillOutcome {
    pub filled_count: usize,
    pub total_fields: usize,
    pub field_results: Vec<FieldFillResult>,
}

/// One selector/value pair handed to the executor. The label travels along
/// only for reporting; it is never written to the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillAssignment {
    pub selector: String,
    #[serde(default)]
    pub label: String,
    pub value: String,
}

/// Result of the cheap DOM-query extraction path. May contain zero fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: Vec<FormField>,
    pub page_title: String,
    pub page_url: String,
}

/// Result of the AI-over-HTML analysis path: value suggestions plus the
/// structure worth remembering for the next visit to this platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub answers: Vec<FieldAnswer>,
    pub cacheable_shape: Vec<FieldShape>,
}

/// What a retry carries back into the next analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousAttempt {
    pub attempt_number: u32,
    pub field_results: Vec<FieldFillResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub resume: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A previously-learned field layout for one ATS platform. Entries are keyed
/// by platform pattern, not per URL, since instances of the same ATS share
/// structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedTemplate {
    pub key: String,
    pub fields: Vec<FieldShape>,
    /// Unix seconds.
    pub created_at: u64,
    #[serde(default)]
    pub fail_count: u32,
}

/// Derived review state presented to the user after a fill pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSummary {
    pub attempt_number: u32,
    pub filled_count: usize,
    pub total_fields: usize,
    /// Fields that did not end up `filled`, in execution order.
    pub attention: Vec<FieldFillResult>,
    pub can_retry: bool,
}

impl FillSummary {
    pub fn all_filled(&self) -> bool {
        self.attention.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_value_rejects_empty_and_whitespace() {
        let mut answer = FieldAnswer {
            selector: "#name".into(),
            label: "Name".into(),
            suggested_value: Some("Jane Doe".into()),
            confidence: Confidence::High,
            note: None,
        };
        assert!(answer.has_value());

        answer.suggested_value = Some(String::new());
        assert!(!answer.has_value());

        answer.suggested_value = Some("   ".into());
        assert!(!answer.has_value());

        answer.suggested_value = None;
        assert!(!answer.has_value());
    }

    #[test]
    fn test_field_shape_strips_runtime_attributes() {
        let field = FormField {
            selector: "#email".into(),
            label: "Email".into(),
            field_type: "text".into(),
            required: true,
            options: None,
            placeholder: Some("you@example.com".into()),
        };

        let shape = FieldShape::from(field);
        let json = serde_json::to_string(&shape).unwrap();
        assert!(!json.contains("placeholder"));
        assert!(!json.contains("required"));
    }

    #[test]
    fn test_fill_status_serializes_snake_case() {
        let json = serde_json::to_string(&FillStatus::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }
}
