use std::sync::Arc;

use modernizer_core::{Message, PipelineEvent};
use modernizer_llm::TextCompletion;
use tokio::sync::mpsc;

use crate::error::{PipelineError, Result};
use crate::types::{InputBinding, StageId, SubTask, TaskOutput};

/// Runs a stage's sub-tasks one after another, feeding each output forward.
pub struct SequentialRunner {
    llm: Arc<dyn TextCompletion>,
    event_tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl SequentialRunner {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        Self {
            llm,
            event_tx: None,
        }
    }

    pub fn with_events(mut self, event_tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub(crate) async fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event).await;
        }
    }

    /// Execute `tasks` strictly in order and return every output.
    ///
    /// The first error aborts the run; outputs produced before it are dropped.
    pub async fn run(&self, stage: StageId, tasks: &[SubTask]) -> Result<Vec<TaskOutput>> {
        if let Some(first) = tasks.first() {
            if matches!(first.binding, InputBinding::PreviousOutput { .. }) {
                return Err(PipelineError::InvalidBinding(first.name.clone()));
            }
        }

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(tasks.len());

        for task in tasks {
            let previous = outputs.last().map(|o| o.output.as_str());
            let prompt = task
                .render_prompt(previous)
                .ok_or_else(|| PipelineError::InvalidBinding(task.name.clone()))?;

            log::info!("[{}] Running task '{}'", stage, task.name);
            log::debug!(
                "[{}] Task '{}' prompt: {} chars, persona: {}",
                stage,
                task.name,
                prompt.len(),
                task.persona.role
            );

            self.emit(PipelineEvent::TaskStarted {
                stage: stage.name().to_string(),
                task: task.name.clone(),
                message: task.progress_message.clone(),
            })
            .await;

            let messages = [
                Message::system(task.persona.system_prompt()),
                Message::user(prompt),
            ];
            let output = self
                .llm
                .complete(&messages)
                .await
                .map_err(|source| PipelineError::Model {
                    task: task.name.clone(),
                    source,
                })?;

            log::info!(
                "[{}] Task '{}' completed ({} chars)",
                stage,
                task.name,
                output.len()
            );
            self.emit(PipelineEvent::TaskCompleted {
                stage: stage.name().to_string(),
                task: task.name.clone(),
                output_chars: output.len(),
            })
            .await;

            outputs.push(TaskOutput {
                task: task.name.clone(),
                output,
            });
        }

        Ok(outputs)
    }
}
