//! Pipeline Orchestrator
//!
//! Turns COBOL source into a BRD and then into Java through a fixed sequence of
//! model requests. Each stage is a list of [`SubTask`]s run in order by the
//! [`SequentialRunner`]; the [`Orchestrator`] guards stage prerequisites and
//! records results on the [`Session`](modernizer_core::Session).

pub mod error;
pub mod export;
pub mod orchestrator;
pub mod prompts;
pub mod runner;
pub mod stages;
pub mod types;

pub use error::{PipelineError, Result};
pub use export::{
    brd_artifact, java_artifact, java_filename, level_summary, Artifact, ArtifactSink,
    DirectorySink, DocumentExporter, MarkdownExporter,
};
pub use orchestrator::{Orchestrator, PipelineRun, EMPTY_SOURCE_WARNING};
pub use runner::SequentialRunner;
pub use types::{
    InputBinding, Persona, StageDefinition, StageId, StageOutcome, StageReport, SubTask,
    TaskOutput, Warning,
};
