use crate::protocol::{FillStatus, FillSummary};

/// Default sensitive field names whose values are masked in logs and output.
const DEFAULT_SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "secret",
    "token",
    "cvv",
    "ssn",
    "card_number",
    "credit_card",
];

/// Render the review summary shown to the user after a fill pass.
pub fn format_summary(summary: &FillSummary) -> String {
    let mut output = if summary.all_filled() {
        format!("ok all {} fields filled\n", summary.total_fields)
    } else {
        format!(
            "{} of {} fields may need attention\n",
            summary.attention.len(),
            summary.total_fields
        )
    };

    for result in &summary.attention {
        match (&result.status, &result.message) {
            (FillStatus::Error, Some(msg)) => {
                output.push_str(&format!(
                    "- {} {:?}: {} ({})\n",
                    result.selector,
                    result.label,
                    result.status.as_str(),
                    msg
                ));
            }
            _ => {
                output.push_str(&format!(
                    "- {} {:?}: {}\n",
                    result.selector,
                    result.label,
                    result.status.as_str()
                ));
            }
        }
    }

    if !summary.can_retry {
        output.push_str("# retry limit reached\n");
    }

    output
}

/// Mask a value if its field label looks sensitive. `sensitive_fields`
/// extends the built-in list.
pub fn mask_sensitive(value: &str, field_label: &str, sensitive_fields: &[String]) -> String {
    let lower_label = field_label.to_lowercase();

    let is_sensitive = sensitive_fields
        .iter()
        .any(|f| lower_label.contains(&f.to_lowercase()))
        || DEFAULT_SENSITIVE_FIELDS
            .iter()
            .any(|f| lower_label.contains(*f));

    if is_sensitive {
        "••••••••".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FieldFillResult;

    #[test]
    fn test_mask_sensitive_by_label() {
        assert_eq!(mask_sensitive("hunter2", "Password", &[]), "••••••••");
        assert_eq!(mask_sensitive("Jane", "Full name", &[]), "Jane");
        assert_eq!(
            mask_sensitive("123-45-6789", "ssn (last 4)", &[]),
            "••••••••"
        );
    }

    #[test]
    fn test_mask_sensitive_extra_fields() {
        let extra = vec!["salary".to_string()];
        assert_eq!(mask_sensitive("90000", "Desired salary", &extra), "••••••••");
        assert_eq!(mask_sensitive("90000", "Desired salary", &[]), "90000");
    }

    #[test]
    fn test_format_summary_all_filled() {
        let summary = FillSummary {
            attempt_number: 0,
            filled_count: 3,
            total_fields: 3,
            attention: vec![],
            can_retry: true,
        };
        assert_eq!(format_summary(&summary), "ok all 3 fields filled\n");
    }

    #[test]
    fn test_format_summary_lists_attention() {
        let summary = FillSummary {
            attempt_number: 1,
            filled_count: 1,
            total_fields: 2,
            attention: vec![FieldFillResult {
                selector: "#cover".into(),
                label: "Cover letter".into(),
                status: FillStatus::NotFound,
                message: None,
            }],
            can_retry: false,
        };
        let output = format_summary(&summary);
        assert!(output.starts_with("1 of 2 fields may need attention\n"));
        assert!(output.contains("- #cover \"Cover letter\": not_found\n"));
        assert!(output.ends_with("# retry limit reached\n"));
    }
}
