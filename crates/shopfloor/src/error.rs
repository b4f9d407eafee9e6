//! Pipeline stage errors.

use shopfloor_data::DataError;
use shopfloor_features::FeatureError;
use shopfloor_output::ExportError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure of one pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source file could not be loaded
    #[error("Load failed: {0}")]
    Load(#[source] DataError),

    /// Missing-value audit failed
    #[error("Audit failed: {0}")]
    Audit(#[source] DataError),

    /// Join with store attributes failed
    #[error("Merge failed: {0}")]
    Merge(#[source] DataError),

    /// Holiday enrichment failed
    #[error("Enrichment failed: {0}")]
    Enrichment(#[source] FeatureError),

    /// Feature derivation failed
    #[error("Feature derivation failed: {0}")]
    Feature(#[source] FeatureError),

    /// Writing results failed
    #[error("Export failed: {0}")]
    Export(#[source] ExportError),

    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Name of the failed stage.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Audit(_) => "audit",
            Self::Merge(_) => "merge",
            Self::Enrichment(_) => "enrichment",
            Self::Feature(_) => "feature",
            Self::Export(_) => "export",
            Self::Config(_) => "config",
        }
    }
}
