use async_trait::async_trait;
use formfill_common::error::AnalyzerError;
use formfill_common::protocol::{
    AnalysisResult, CandidateProfile, ExtractionResult, FieldAnswer, FieldShape, JobContext,
    PreviousAttempt,
};

/// The extraction/analysis collaborator, bound to the current page.
///
/// Two strategies exist upstream: a cheap DOM-query extractor and an
/// AI-over-cleaned-HTML analyzer. The engine treats both as one capability
/// and only decides which path runs (the cache decides whether the
/// expensive path can be skipped) and what feedback a retry carries.
#[async_trait]
pub trait FormAnalyzer: Send + Sync {
    /// Cheap DOM-query extraction: field existence and shape only. May
    /// return zero fields.
    async fn extract_fields(&mut self) -> Result<ExtractionResult, AnalyzerError>;

    /// AI analysis over the cleaned page HTML: shape and suggested values
    /// in one call, optionally steered by the previous attempt's outcome.
    async fn analyze_html(
        &mut self,
        profile: &CandidateProfile,
        job: &JobContext,
        previous: Option<&PreviousAttempt>,
    ) -> Result<AnalysisResult, AnalyzerError>;

    /// Generate values for an already-known field shape, skipping HTML
    /// re-analysis. Used when a cached template exists for this platform.
    async fn generate_answers(
        &mut self,
        shape: &[FieldShape],
        profile: &CandidateProfile,
        job: &JobContext,
    ) -> Result<Vec<FieldAnswer>, AnalyzerError>;
}
