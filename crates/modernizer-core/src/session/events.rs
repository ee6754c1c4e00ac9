use serde::{Deserialize, Serialize};

use super::types::OptimizationLevel;

/// Progress events emitted while a stage runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        stage: String,
    },

    /// A model request is about to be sent; `message` is the user-facing progress line
    TaskStarted {
        stage: String,
        task: String,
        message: String,
    },

    TaskCompleted {
        stage: String,
        task: String,
        output_chars: usize,
    },

    StageCompleted {
        stage: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        level: Option<OptimizationLevel>,
    },

    /// Guard check failed; nothing was sent to the model
    StageSkipped {
        stage: String,
        warning: String,
    },

    StageFailed {
        stage: String,
        error: String,
    },
}

impl PipelineEvent {
    pub fn stage(&self) -> &str {
        match self {
            PipelineEvent::StageStarted { stage }
            | PipelineEvent::TaskStarted { stage, .. }
            | PipelineEvent::TaskCompleted { stage, .. }
            | PipelineEvent::StageCompleted { stage, .. }
            | PipelineEvent::StageSkipped { stage, .. }
            | PipelineEvent::StageFailed { stage, .. } => stage,
        }
    }
}
