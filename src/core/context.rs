use crate::domain::model::SourceDescriptor;
use chrono::{DateTime, Utc};

/// Run-level state threaded through one pipeline run and folded into the
/// payload at the end. A fresh context per run keeps runs independent.
#[derive(Debug, Clone)]
pub struct RunContext {
    generated_at: DateTime<Utc>,
    sources: Vec<SourceDescriptor>,
    warnings: Vec<String>,
    total_mentions: usize,
    previous_names: Vec<String>,
}

impl RunContext {
    pub fn new(generated_at: DateTime<Utc>, sources: Vec<SourceDescriptor>) -> Self {
        Self {
            generated_at,
            sources,
            warnings: Vec::new(),
            total_mentions: 0,
            previous_names: Vec::new(),
        }
    }

    /// Names published in the previous issue, for novelty scoring.
    pub fn with_previous_names(mut self, names: Vec<String>) -> Self {
        self.previous_names = names;
        self
    }

    pub fn now(sources: Vec<SourceDescriptor>) -> Self {
        Self::new(Utc::now(), sources)
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("⚠️ {}", warning);
        self.warnings.push(warning);
    }

    pub fn record_mentions(&mut self, count: usize) {
        self.total_mentions += count;
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn previous_names(&self) -> &[String] {
        &self.previous_names
    }

    pub fn total_mentions(&self) -> usize {
        self.total_mentions
    }

    pub(crate) fn into_parts(self) -> (DateTime<Utc>, Vec<SourceDescriptor>, Vec<String>, usize) {
        (
            self.generated_at,
            self.sources,
            self.warnings,
            self.total_mentions,
        )
    }
}
