use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use modernizer_core::{paths, Config, JsonlStorage, Message, PipelineEvent, Session};
use modernizer_llm::{create_provider, LLMError, ProviderCompletion, TextCompletion};
use modernizer_pipeline::{
    brd_artifact, java_artifact, level_summary, ArtifactSink, DirectorySink, MarkdownExporter,
    Orchestrator, PipelineRun, StageId,
};
use tokio::sync::{mpsc, OnceCell};

use crate::output;

/// What a pipeline command asks the orchestrator to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageAction {
    Single(StageId),
    Through(StageId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShowTarget {
    Status,
    Brd,
    Analysis,
    Java,
    Original,
    Evaluation,
}

pub struct Context {
    config: Config,
    storage: JsonlStorage,
    session_id: String,
}

impl Context {
    pub async fn open(config: Config, session_id: String) -> Result<Self> {
        let storage = JsonlStorage::new(paths::sessions_dir(&config.data_dir()));
        storage
            .init()
            .await
            .with_context(|| format!("Failed to create {}", storage.base_path().display()))?;

        Ok(Self {
            config,
            storage,
            session_id,
        })
    }

    async fn session(&self) -> Result<Session> {
        Ok(self.storage.load_or_create(&self.session_id).await?)
    }
}

/// Creates the provider on the first model request, so stages rejected by
/// their guard never need credentials.
struct LazyCompletion {
    config: Config,
    inner: OnceCell<ProviderCompletion>,
}

impl LazyCompletion {
    fn new(config: Config) -> Self {
        Self {
            config,
            inner: OnceCell::new(),
        }
    }
}

#[async_trait]
impl TextCompletion for LazyCompletion {
    async fn complete(&self, messages: &[Message]) -> modernizer_llm::provider::Result<String> {
        let completion = self
            .inner
            .get_or_try_init(|| async {
                let provider = create_provider(&self.config)?;
                Ok::<_, LLMError>(
                    ProviderCompletion::new(provider)
                        .with_max_output_tokens(self.config.max_output_tokens),
                )
            })
            .await?;
        completion.complete(messages).await
    }
}

pub async fn read_input(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn read_optional_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_input(path).await,
        None => Ok(String::new()),
    }
}

/// Run one stage, or every stage up to a target, and persist the session.
pub async fn run_pipeline(
    ctx: &Context,
    action: StageAction,
    cobol_source: &str,
    glossary: &str,
) -> Result<()> {
    let completion = Arc::new(LazyCompletion::new(ctx.config.clone()));
    run_with(ctx, completion, action, cobol_source, glossary).await
}

async fn run_with(
    ctx: &Context,
    completion: Arc<dyn TextCompletion>,
    action: StageAction,
    cobol_source: &str,
    glossary: &str,
) -> Result<()> {
    let mut session = ctx.session().await?;
    let (event_tx, event_rx) = mpsc::channel(64);
    let orchestrator = Orchestrator::new(completion).with_events(event_tx);
    let printer = tokio::spawn(output::forward_events(
        event_rx,
        ctx.storage.clone(),
        session.id.clone(),
    ));

    let run = match action {
        StageAction::Single(stage) => PipelineRun::from_stage(
            orchestrator
                .run_stage(&mut session, stage, cobol_source, glossary)
                .await,
        ),
        StageAction::Through(until) => {
            orchestrator
                .run_through(&mut session, cobol_source, glossary, until)
                .await
        }
    };

    drop(orchestrator);
    if let Err(e) = printer.await {
        log::warn!("Event printer stopped: {}", e);
    }

    // Stages completed before a failure keep their results
    ctx.storage.save_session(&session).await?;
    output::print_outcomes(&run.outcomes);

    match run.failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

pub async fn show(ctx: &Context, target: ShowTarget) -> Result<()> {
    let session = ctx.session().await?;

    match target {
        ShowTarget::Status => output::print_status(&session),
        ShowTarget::Brd => output::print_text(
            "Business Requirements Document (BRD)",
            session.brd_output.as_deref(),
            "Please generate a BRD first.",
        ),
        ShowTarget::Analysis => output::print_text(
            "COBOL Analysis",
            session.analysis_output.as_deref(),
            "Please generate a BRD first.",
        ),
        ShowTarget::Java => {
            if session.java_output.is_some() {
                println!("{}", level_summary(session.optimization_level));
                println!();
            }
            output::print_text(
                "Java Code Implementation",
                session.java_output.as_deref(),
                "Please generate Java code first.",
            )
        }
        ShowTarget::Original => output::print_text(
            "Original Java Implementation",
            session.original_java_output.as_deref(),
            "Please generate Java code first.",
        ),
        ShowTarget::Evaluation => output::print_text(
            "Evaluation Report",
            session.evaluation_report.as_deref(),
            "Please evaluate and optimize the Java code first.",
        ),
    }

    Ok(())
}

/// Write the BRD document and the Java file, whichever exist.
pub async fn export(ctx: &Context, out: Option<PathBuf>) -> Result<Vec<PathBuf>> {
    let session = ctx.session().await?;
    let dir = out.unwrap_or_else(|| paths::exports_dir(&ctx.config.data_dir(), &session.id));
    let sink = DirectorySink::new(dir);

    let artifacts = [
        brd_artifact(&session, &MarkdownExporter)?,
        java_artifact(&session),
    ];

    let mut written = Vec::new();
    for artifact in artifacts.iter().flatten() {
        let path = sink.deliver(artifact).await?;
        output::success(&format!("Saved {}", path.display()));
        written.push(path);
    }

    if written.is_empty() {
        output::warning("Nothing to export yet. Please generate a BRD first.");
    }

    Ok(written)
}

pub async fn stages(ctx: &Context) -> Result<()> {
    let session = ctx.session().await?;
    output::heading(&format!("Stages for session {} ({})", session.id, session.state()));
    output::print_stages(&session);
    Ok(())
}

pub async fn sessions(ctx: &Context) -> Result<()> {
    let sessions = ctx.storage.list_sessions().await?;
    output::print_sessions(&sessions);
    Ok(())
}
