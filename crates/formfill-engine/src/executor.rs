use crate::page::{DomEvent, ElementKind, FormPage};
use formfill_common::error::PageError;
use formfill_common::formatter::mask_sensitive;
use formfill_common::protocol::{FieldFillResult, FillAssignment, FillOutcome, FillStatus};
use tracing::{debug, warn};

/// Writes field values into the live page, one assignment at a time, using
/// a type-specific strategy per resolved element kind. A failed field never
/// aborts the remaining ones; retries are a controller-level concept.
pub struct FillExecutor {
    sensitive_fields: Vec<String>,
    redact_in_logs: bool,
}

impl Default for FillExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FillExecutor {
    pub fn new() -> Self {
        Self {
            sensitive_fields: Vec::new(),
            redact_in_logs: true,
        }
    }

    pub fn with_security(sensitive_fields: Vec<String>, redact_in_logs: bool) -> Self {
        Self {
            sensitive_fields,
            redact_in_logs,
        }
    }

    /// Execute all assignments against the page. Infallible at this level:
    /// per-field failures are recorded in the outcome instead of propagated.
    pub async fn execute<P: FormPage + ?Sized>(
        &self,
        page: &mut P,
        assignments: &[FillAssignment],
    ) -> FillOutcome {
        let mut field_results = Vec::with_capacity(assignments.len());

        for assignment in assignments {
            let logged_value = if self.redact_in_logs {
                mask_sensitive(&assignment.value, &assignment.label, &self.sensitive_fields)
            } else {
                assignment.value.clone()
            };

            let result = match self.fill_one(page, assignment).await {
                Ok(()) => {
                    debug!(selector = %assignment.selector, value = %logged_value, "filled field");
                    FieldFillResult {
                        selector: assignment.selector.clone(),
                        label: assignment.label.clone(),
                        status: FillStatus::Filled,
                        message: None,
                    }
                }
                Err(e) if e.is_not_found() => {
                    debug!(selector = %assignment.selector, "selector matched nothing");
                    FieldFillResult {
                        selector: assignment.selector.clone(),
                        label: assignment.label.clone(),
                        status: FillStatus::NotFound,
                        message: None,
                    }
                }
                Err(e) => {
                    warn!(selector = %assignment.selector, error = %e, "field write failed");
                    FieldFillResult {
                        selector: assignment.selector.clone(),
                        label: assignment.label.clone(),
                        status: FillStatus::Error,
                        message: Some(e.to_string()),
                    }
                }
            };
            field_results.push(result);
        }

        let filled_count = field_results
            .iter()
            .filter(|r| r.status == FillStatus::Filled)
            .count();

        FillOutcome {
            filled_count,
            total_fields: assignments.len(),
            field_results,
        }
    }

    async fn fill_one<P: FormPage + ?Sized>(
        &self,
        page: &mut P,
        assignment: &FillAssignment,
    ) -> Result<(), PageError> {
        let kind = page
            .resolve(&assignment.selector)
            .await?
            .ok_or_else(|| PageError::ElementNotFound {
                selector: assignment.selector.clone(),
            })?;

        match kind {
            ElementKind::Select => {
                page.set_select_value(&assignment.selector, &assignment.value)
                    .await?;
                page.dispatch(&assignment.selector, &[DomEvent::Change])
                    .await?;
            }
            ElementKind::ContentEditable => {
                page.set_text_content(&assignment.selector, &assignment.value)
                    .await?;
                page.dispatch(&assignment.selector, &[DomEvent::Input])
                    .await?;
            }
            // Unknown controls get the text-input treatment; the page seam
            // reports the failure if the element rejects it.
            ElementKind::TextInput | ElementKind::TextArea | ElementKind::Other => {
                page.set_native_value(&assignment.selector, &assignment.value)
                    .await?;
                page.dispatch(
                    &assignment.selector,
                    &[DomEvent::Input, DomEvent::Change, DomEvent::Blur],
                )
                .await?;
            }
        }

        Ok(())
    }
}
