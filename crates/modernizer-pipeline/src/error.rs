use modernizer_llm::LLMError;
use thiserror::Error;

/// Failures that abort a stage. Guard-check rejections are not errors; see
/// [`StageOutcome::Skipped`](crate::StageOutcome::Skipped).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Model request failed during '{task}': {source}")]
    Model {
        task: String,
        #[source]
        source: LLMError,
    },

    #[error("Task '{0}' binds to a previous output but is the first task of its stage")]
    InvalidBinding(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
