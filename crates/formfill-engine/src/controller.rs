use crate::analyzer::FormAnalyzer;
use crate::cache::TemplateCache;
use crate::config::FormfillConfig;
use crate::executor::FillExecutor;
use crate::page::FormPage;
use crate::platform;
use crate::session::AutofillSession;
use formfill_common::error::AnalyzerError;
use formfill_common::protocol::{
    CandidateProfile, FieldAnswer, FillAssignment, FillSummary, JobContext,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("No form detected on page")]
    NoFormDetected,

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalyzerError),

    #[error("Retry is disabled after {0} attempts")]
    RetriesExhausted(u32),

    #[error("No active session")]
    NoSession,

    #[error("Command '{command}' not valid in state {state:?}")]
    InvalidTransition {
        state: SessionState,
        command: &'static str,
    },
}

/// Lifecycle of one autofill interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Extracting,
    Filling,
    Verifying,
    Accepted,
    Retrying,
    Exhausted,
}

/// User-driven commands, dispatched through one explicit tagged union
/// instead of a string-keyed handler registry.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Start,
    Accept,
    Retry { feedback: Option<String> },
}

impl SessionCommand {
    fn name(&self) -> &'static str {
        match self {
            SessionCommand::Start => "start",
            SessionCommand::Accept => "accept",
            SessionCommand::Retry { .. } => "retry",
        }
    }
}

/// What a dispatched command produced.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// A fill pass completed; the user reviews it and accepts or retries.
    AwaitingReview(FillSummary),
    /// The user accepted; cache promotion/demotion side effects are done.
    Accepted,
}

/// The verification/retry state machine.
///
/// Drives one [`AutofillSession`] through
/// Idle → Extracting → Filling → Verifying → {Accepted | Retrying} →
/// Exhausted, with a bounded retry loop (no recursion) and all cache
/// promotion/demotion decided here and nowhere else.
pub struct AutofillController<'a, P: FormPage + ?Sized, A: FormAnalyzer + ?Sized> {
    page: &'a mut P,
    analyzer: &'a mut A,
    cache: TemplateCache,
    executor: FillExecutor,
    profile: CandidateProfile,
    job: JobContext,
    state: SessionState,
    session: Option<AutofillSession>,
    max_attempts: u32,
}

impl<'a, P: FormPage + ?Sized, A: FormAnalyzer + ?Sized> AutofillController<'a, P, A> {
    pub fn new(
        page: &'a mut P,
        analyzer: &'a mut A,
        cache: TemplateCache,
        profile: CandidateProfile,
        job: JobContext,
    ) -> Self {
        Self::with_config(page, analyzer, cache, profile, job, &FormfillConfig::default())
    }

    pub fn with_config(
        page: &'a mut P,
        analyzer: &'a mut A,
        cache: TemplateCache,
        profile: CandidateProfile,
        job: JobContext,
        config: &FormfillConfig,
    ) -> Self {
        Self {
            page,
            analyzer,
            cache,
            executor: FillExecutor::with_security(
                config.security.sensitive_fields.clone(),
                config.security.redact_in_logs,
            ),
            profile,
            job,
            state: SessionState::Idle,
            session: None,
            max_attempts: config.session.max_attempts,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session(&self) -> Option<&AutofillSession> {
        self.session.as_ref()
    }

    /// Single dispatch point for the state machine.
    pub async fn handle(
        &mut self,
        command: SessionCommand,
    ) -> Result<SessionOutcome, ControllerError> {
        debug!(state = ?self.state, command = command.name(), "dispatching session command");
        match command {
            SessionCommand::Start => self.start().await.map(SessionOutcome::AwaitingReview),
            SessionCommand::Accept => self.accept().await.map(|_| SessionOutcome::Accepted),
            SessionCommand::Retry { feedback } => {
                self.retry(feedback).await.map(SessionOutcome::AwaitingReview)
            }
        }
    }

    async fn start(&mut self) -> Result<FillSummary, ControllerError> {
        if !matches!(self.state, SessionState::Idle | SessionState::Accepted) {
            return Err(ControllerError::InvalidTransition {
                state: self.state,
                command: "start",
            });
        }

        self.state = SessionState::Extracting;

        let extraction = match self.analyzer.extract_fields().await {
            Ok(extraction) => extraction,
            Err(e) => {
                self.state = SessionState::Idle;
                return Err(e.into());
            }
        };

        if extraction.fields.is_empty() {
            self.state = SessionState::Idle;
            return Err(ControllerError::NoFormDetected);
        }

        let mut session = AutofillSession::new(self.max_attempts);
        session.cache_key = platform::derive_key(&extraction.page_url);

        let cached = match &session.cache_key {
            Some(key) => self.cache.get(key).await,
            None => None,
        };

        let answers = match cached {
            Some(template) => {
                debug!(key = %template.key, "using cached template, skipping analysis");
                session.used_cache = true;
                session.pending_shape = template.fields.clone();
                match self
                    .analyzer
                    .generate_answers(&template.fields, &self.profile, &self.job)
                    .await
                {
                    Ok(answers) => answers,
                    Err(e) => {
                        self.state = SessionState::Idle;
                        return Err(e.into());
                    }
                }
            }
            None => {
                match self
                    .analyzer
                    .analyze_html(&self.profile, &self.job, None)
                    .await
                {
                    Ok(analysis) => {
                        session.pending_shape = analysis.cacheable_shape;
                        analysis.answers
                    }
                    Err(e) => {
                        self.state = SessionState::Idle;
                        return Err(e.into());
                    }
                }
            }
        };

        self.session = Some(session);
        self.fill_and_verify(answers).await
    }

    async fn accept(&mut self) -> Result<(), ControllerError> {
        if !matches!(self.state, SessionState::Verifying | SessionState::Exhausted) {
            return Err(ControllerError::InvalidTransition {
                state: self.state,
                command: "accept",
            });
        }

        let session = self.session.take().ok_or(ControllerError::NoSession)?;

        if let Some(key) = &session.cache_key {
            if session.used_cache {
                self.cache.reset_fail(key).await;
            } else if !session.pending_shape.is_empty() {
                self.cache.put(key, session.pending_shape).await;
            }
        }

        self.state = SessionState::Accepted;
        Ok(())
    }

    async fn retry(&mut self, feedback: Option<String>) -> Result<FillSummary, ControllerError> {
        match self.state {
            SessionState::Verifying => {}
            SessionState::Exhausted => {
                return Err(ControllerError::RetriesExhausted(self.max_attempts));
            }
            _ => {
                return Err(ControllerError::InvalidTransition {
                    state: self.state,
                    command: "retry",
                });
            }
        }

        let session = self.session.as_mut().ok_or(ControllerError::NoSession)?;
        if !session.can_retry() {
            self.state = SessionState::Exhausted;
            return Err(ControllerError::RetriesExhausted(session.max_attempts));
        }

        self.state = SessionState::Retrying;
        session.attempt_number += 1;
        if let Some(text) = feedback
            && !text.trim().is_empty()
        {
            session.feedback.push(text);
        }

        // A cached template that needed a retry is penalized even if the
        // retry eventually succeeds: its structure was not immediately
        // actionable.
        if let Some(key) = session.cache_key.clone() {
            self.cache.increment_fail(&key).await;
        }

        let previous = session.previous_attempt();
        session.used_cache = false;

        self.state = SessionState::Extracting;
        let analysis = match self
            .analyzer
            .analyze_html(&self.profile, &self.job, Some(&previous))
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => {
                // The attempt is spent, but the previous fill is still on
                // the page; let the user accept it or retry again.
                let can_retry = self
                    .session
                    .as_ref()
                    .is_some_and(AutofillSession::can_retry);
                self.state = if can_retry {
                    SessionState::Verifying
                } else {
                    SessionState::Exhausted
                };
                return Err(e.into());
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.pending_shape = analysis.cacheable_shape;
        }
        self.fill_and_verify(analysis.answers).await
    }

    async fn fill_and_verify(
        &mut self,
        answers: Vec<FieldAnswer>,
    ) -> Result<FillSummary, ControllerError> {
        self.state = SessionState::Filling;

        // Answers without a value are simply absent input: excluded from the
        // executor and from the totals, but never reported as failures.
        let assignments: Vec<FillAssignment> = answers
            .iter()
            .filter(|a| a.has_value())
            .map(|a| FillAssignment {
                selector: a.selector.clone(),
                label: a.label.clone(),
                value: a.suggested_value.clone().unwrap_or_default(),
            })
            .collect();

        let outcome = self.executor.execute(&mut *self.page, &assignments).await;

        let session = self.session.as_mut().ok_or(ControllerError::NoSession)?;
        session.last_field_results = outcome.field_results.clone();

        self.state = if session.can_retry() {
            SessionState::Verifying
        } else {
            SessionState::Exhausted
        };

        Ok(session.summarize(&outcome))
    }
}
