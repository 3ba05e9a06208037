use formfill_common::protocol::{
    FieldFillResult, FieldShape, FillOutcome, FillStatus, FillSummary, PreviousAttempt,
};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// In-memory state for one form-fill interaction. Created when the user
/// first triggers autofill, dropped when they accept or exhaust retries;
/// never persisted. The controller is its only owner.
#[derive(Debug, Clone)]
pub struct AutofillSession {
    /// Number of retries taken so far; 0 for the initial pass.
    pub attempt_number: u32,
    pub max_attempts: u32,
    /// Platform key for this page, if the platform is recognized.
    pub cache_key: Option<String>,
    /// Whether the current fill came from a cached template rather than a
    /// fresh analysis. Flips to false once a retry re-analyzes.
    pub used_cache: bool,
    /// Shape to promote into the cache if the user accepts a fresh analysis.
    pub pending_shape: Vec<FieldShape>,
    pub last_field_results: Vec<FieldFillResult>,
    /// Free-text user feedback, accumulated across retries.
    pub feedback: Vec<String>,
}

impl AutofillSession {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt_number: 0,
            max_attempts,
            cache_key: None,
            used_cache: false,
            pending_shape: Vec::new(),
            last_field_results: Vec::new(),
            feedback: Vec::new(),
        }
    }

    pub fn can_retry(&self) -> bool {
        self.attempt_number < self.max_attempts
    }

    /// Package this session's history for the next analysis call.
    pub fn previous_attempt(&self) -> PreviousAttempt {
        PreviousAttempt {
            attempt_number: self.attempt_number,
            field_results: self.last_field_results.clone(),
            user_feedback: if self.feedback.is_empty() {
                None
            } else {
                Some(self.feedback.join("\n"))
            },
        }
    }

    /// Derive the review summary for an executor outcome.
    pub fn summarize(&self, outcome: &FillOutcome) -> FillSummary {
        let attention: Vec<FieldFillResult> = outcome
            .field_results
            .iter()
            .filter(|r| r.status != FillStatus::Filled)
            .cloned()
            .collect();

        FillSummary {
            attempt_number: self.attempt_number,
            filled_count: outcome.filled_count,
            total_fields: outcome.total_fields,
            attention,
            can_retry: self.can_retry(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_retry_bound() {
        let mut session = AutofillSession::new(DEFAULT_MAX_ATTEMPTS);
        assert!(session.can_retry());
        session.attempt_number = 2;
        assert!(session.can_retry());
        session.attempt_number = 3;
        assert!(!session.can_retry());
    }

    #[test]
    fn test_previous_attempt_joins_feedback() {
        let mut session = AutofillSession::new(3);
        session.attempt_number = 2;
        session.feedback.push("use my full name".into());
        session.feedback.push("the phone field wants digits only".into());

        let previous = session.previous_attempt();
        assert_eq!(previous.attempt_number, 2);
        assert_eq!(
            previous.user_feedback.as_deref(),
            Some("use my full name\nthe phone field wants digits only")
        );

        session.feedback.clear();
        assert_eq!(session.previous_attempt().user_feedback, None);
    }

    #[test]
    fn test_summarize_collects_non_filled() {
        let session = AutofillSession::new(3);
        let outcome = FillOutcome {
            filled_count: 1,
            total_fields: 2,
            field_results: vec![
                FieldFillResult {
                    selector: "#name".into(),
                    label: "Name".into(),
                    status: FillStatus::Filled,
                    message: None,
                },
                FieldFillResult {
                    selector: "#phone".into(),
                    label: "Phone".into(),
                    status: FillStatus::NotFound,
                    message: None,
                },
            ],
        };

        let summary = session.summarize(&outcome);
        assert!(!summary.all_filled());
        assert_eq!(summary.attention.len(), 1);
        assert_eq!(summary.attention[0].selector, "#phone");
        assert!(summary.can_retry);
    }
}
