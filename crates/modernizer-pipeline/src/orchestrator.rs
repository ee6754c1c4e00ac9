//! Guarded stage transitions over a [`Session`].
//!
//! Every stage follows the same shape: check the prerequisite, build the
//! stage's sub-tasks from session text, run them, record the results. A failed
//! guard returns [`StageOutcome::Skipped`] without contacting the model. A
//! model failure returns an error and leaves the session untouched.

use std::sync::Arc;

use modernizer_core::{OptimizationLevel, PipelineEvent, Session};
use modernizer_llm::TextCompletion;
use tokio::sync::mpsc;

use crate::error::{PipelineError, Result};
use crate::runner::SequentialRunner;
use crate::stages;
use crate::types::{StageId, StageOutcome, StageReport, SubTask, TaskOutput, Warning};

/// Outcomes of a multi-stage run, plus the error that ended it early, if any
#[derive(Debug, Default)]
pub struct PipelineRun {
    pub outcomes: Vec<StageOutcome>,
    pub failure: Option<PipelineError>,
}

impl PipelineRun {
    pub fn from_stage(result: Result<StageOutcome>) -> Self {
        match result {
            Ok(outcome) => Self {
                outcomes: vec![outcome],
                failure: None,
            },
            Err(err) => Self {
                outcomes: Vec::new(),
                failure: Some(err),
            },
        }
    }

    pub fn into_result(self) -> Result<Vec<StageOutcome>> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.outcomes),
        }
    }
}

pub const EMPTY_SOURCE_WARNING: &str = "Please enter some COBOL code.";

pub struct Orchestrator {
    runner: SequentialRunner,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        Self {
            runner: SequentialRunner::new(llm),
        }
    }

    pub fn with_events(mut self, event_tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.runner = self.runner.with_events(event_tx);
        self
    }

    /// Analyze the COBOL source and draft the BRD from that analysis.
    pub async fn generate_brd(
        &self,
        session: &mut Session,
        cobol_source: &str,
        glossary: &str,
    ) -> Result<StageOutcome> {
        let stage = StageId::GenerateBrd;
        if cobol_source.trim().is_empty() {
            return Ok(self.skip(session, stage, EMPTY_SOURCE_WARNING).await);
        }

        let tasks = stages::brd_tasks(cobol_source, glossary);
        let outputs = self.execute(session, stage, &tasks).await?;

        let analysis = output_of(&outputs, 0);
        let brd = output_of(&outputs, 1);
        session.record_brd(cobol_source, glossary, analysis, brd);

        Ok(self.complete(session, stage, outputs).await)
    }

    pub async fn generate_java(&self, session: &mut Session) -> Result<StageOutcome> {
        let stage = StageId::GenerateJava;
        if let Some(warning) = stage.missing_prerequisite(session) {
            return Ok(self.skip(session, stage, warning).await);
        }

        let tasks = stages::java_tasks(
            session.cobol_source.as_deref().unwrap_or_default(),
            session.brd_output.as_deref().unwrap_or_default(),
        );
        let outputs = self.execute(session, stage, &tasks).await?;

        session.record_java(output_of(&outputs, 0));

        Ok(self.complete(session, stage, outputs).await)
    }

    /// Evaluate the current Java against the COBOL source, then optimize it
    /// using the evaluation report.
    pub async fn evaluate_and_optimize(&self, session: &mut Session) -> Result<StageOutcome> {
        let stage = StageId::EvaluateAndOptimize;
        if let Some(warning) = stage.missing_prerequisite(session) {
            return Ok(self.skip(session, stage, warning).await);
        }

        let tasks = stages::evaluation_tasks(
            session.cobol_source.as_deref().unwrap_or_default(),
            session.java_output.as_deref().unwrap_or_default(),
        );
        let outputs = self.execute(session, stage, &tasks).await?;

        session.record_optimization(output_of(&outputs, 0), output_of(&outputs, 1));

        Ok(self.complete(session, stage, outputs).await)
    }

    pub async fn refine_enterprise(&self, session: &mut Session) -> Result<StageOutcome> {
        let stage = StageId::RefineEnterprise;
        if let Some(warning) = stage.missing_prerequisite(session) {
            return Ok(self.skip(session, stage, warning).await);
        }

        let tasks = stages::enterprise_tasks(
            session.cobol_source.as_deref().unwrap_or_default(),
            session.java_output.as_deref().unwrap_or_default(),
        );
        let outputs = self.execute(session, stage, &tasks).await?;

        session.record_enterprise(output_of(&outputs, 0));

        Ok(self.complete(session, stage, outputs).await)
    }

    /// Run one stage by id. `cobol_source` and `glossary` only matter for BRD generation.
    pub async fn run_stage(
        &self,
        session: &mut Session,
        stage: StageId,
        cobol_source: &str,
        glossary: &str,
    ) -> Result<StageOutcome> {
        match stage {
            StageId::GenerateBrd => self.generate_brd(session, cobol_source, glossary).await,
            StageId::GenerateJava => self.generate_java(session).await,
            StageId::EvaluateAndOptimize => self.evaluate_and_optimize(session).await,
            StageId::RefineEnterprise => self.refine_enterprise(session).await,
        }
    }

    /// Run every stage from BRD generation up to and including `until`.
    ///
    /// Stops after the first skipped stage, whose outcome is the last one
    /// recorded, or at the first failure. Stages completed before a failure
    /// stay recorded on the session and in the returned run.
    pub async fn run_through(
        &self,
        session: &mut Session,
        cobol_source: &str,
        glossary: &str,
        until: StageId,
    ) -> PipelineRun {
        let mut run = PipelineRun::default();

        for stage in StageId::all().into_iter().filter(|s| *s <= until) {
            match self.run_stage(session, stage, cobol_source, glossary).await {
                Ok(outcome) => {
                    let skipped = !outcome.is_completed();
                    run.outcomes.push(outcome);
                    if skipped {
                        break;
                    }
                }
                Err(err) => {
                    run.failure = Some(err);
                    break;
                }
            }
        }

        run
    }

    async fn execute(
        &self,
        session: &Session,
        stage: StageId,
        tasks: &[SubTask],
    ) -> Result<Vec<TaskOutput>> {
        log::info!("[{}] Starting stage {}", session.id, stage);
        self.runner
            .emit(PipelineEvent::StageStarted {
                stage: stage.name().to_string(),
            })
            .await;

        match self.runner.run(stage, tasks).await {
            Ok(outputs) => Ok(outputs),
            Err(err) => {
                log::error!("[{}] Stage {} failed: {}", session.id, stage, err);
                self.runner
                    .emit(PipelineEvent::StageFailed {
                        stage: stage.name().to_string(),
                        error: err.to_string(),
                    })
                    .await;
                Err(err)
            }
        }
    }

    async fn complete(
        &self,
        session: &Session,
        stage: StageId,
        outputs: Vec<TaskOutput>,
    ) -> StageOutcome {
        let level: Option<OptimizationLevel> = session.optimization_level;
        log::info!(
            "[{}] Stage {} completed, state now {}",
            session.id,
            stage,
            session.state()
        );
        self.runner
            .emit(PipelineEvent::StageCompleted {
                stage: stage.name().to_string(),
                level,
            })
            .await;

        StageOutcome::Completed(StageReport {
            stage,
            outputs,
            level,
        })
    }

    async fn skip(&self, session: &Session, stage: StageId, message: &str) -> StageOutcome {
        log::warn!("[{}] Stage {} skipped: {}", session.id, stage, message);
        self.runner
            .emit(PipelineEvent::StageSkipped {
                stage: stage.name().to_string(),
                warning: message.to_string(),
            })
            .await;

        StageOutcome::Skipped(Warning {
            stage,
            message: message.to_string(),
        })
    }
}

fn output_of(outputs: &[TaskOutput], index: usize) -> String {
    outputs
        .get(index)
        .map(|o| o.output.clone())
        .unwrap_or_default()
}
