use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use modernizer_core::{Message, OptimizationLevel, PipelineEvent, PipelineState, Session};
use modernizer_llm::{LLMError, TextCompletion};
use modernizer_pipeline::prompts::BRD_SECTIONS;
use modernizer_pipeline::{
    java_artifact, Orchestrator, PipelineError, StageId, StageOutcome, EMPTY_SOURCE_WARNING,
};
use tokio::sync::mpsc;

const COBOL: &str = "IDENTIFICATION DIVISION.\nPROGRAM-ID. PAYROLL.\nPROCEDURE DIVISION.\n    STOP RUN.";

/// Replies with the user prompt it was given.
#[derive(Default)]
struct EchoCompletion {
    calls: Mutex<usize>,
}

#[async_trait]
impl TextCompletion for EchoCompletion {
    async fn complete(&self, messages: &[Message]) -> modernizer_llm::provider::Result<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default())
    }
}

/// Replies with a fixed token per call and records every request.
struct ScriptedCompletion {
    replies: Mutex<Vec<Result<String, String>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedCompletion {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(replies: &[&str], failure: usize) -> Self {
        let mut script: Vec<Result<String, String>> =
            replies.iter().map(|r| Ok(r.to_string())).collect();
        script.insert(failure, Err("service unavailable".to_string()));
        script.reverse();
        Self {
            replies: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompletion for ScriptedCompletion {
    async fn complete(&self, messages: &[Message]) -> modernizer_llm::provider::Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LLMError::Api(message)),
            None => Err(LLMError::Api("script exhausted".to_string())),
        }
    }
}

fn warning_of(outcome: &StageOutcome) -> &str {
    outcome
        .warning()
        .map(|w| w.message.as_str())
        .expect("stage should have been skipped")
}

#[tokio::test]
async fn echoed_brd_lists_section_headers_in_order() {
    let orchestrator = Orchestrator::new(Arc::new(EchoCompletion::default()));
    let mut session = Session::new("echo");

    let outcome = orchestrator
        .generate_brd(&mut session, COBOL, "PAYROLL = pay run")
        .await
        .unwrap();

    assert!(outcome.is_completed());
    let brd = session.brd_output.as_deref().unwrap();
    let positions: Vec<usize> = BRD_SECTIONS
        .iter()
        .map(|s| brd.find(s).unwrap_or_else(|| panic!("missing section {s}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    // drafting input carries the echoed analysis, which carries the source
    assert!(brd.contains("COBOL Analysis Output:"));
    assert!(brd.contains("PROGRAM-ID. PAYROLL."));
    assert_eq!(session.cobol_source.as_deref(), Some(COBOL));
    assert_eq!(session.glossary.as_deref(), Some("PAYROLL = pay run"));
}

#[tokio::test]
async fn empty_source_is_rejected_without_model_calls() {
    let llm = Arc::new(EchoCompletion::default());
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("empty");

    for source in ["", "   \n\t"] {
        let outcome = orchestrator
            .generate_brd(&mut session, source, "")
            .await
            .unwrap();
        assert_eq!(warning_of(&outcome), EMPTY_SOURCE_WARNING);
    }

    assert!(session.brd_output.is_none());
    assert_eq!(*llm.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn java_before_brd_warns() {
    let llm = Arc::new(EchoCompletion::default());
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("early");

    let outcome = orchestrator.generate_java(&mut session).await.unwrap();

    assert_eq!(warning_of(&outcome), "Please generate a BRD first.");
    assert!(session.java_output.is_none());
    assert_eq!(*llm.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn every_guard_leaves_state_unchanged_and_skips_the_model() {
    let llm = Arc::new(ScriptedCompletion::new(&[]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("guards");
    let before = serde_json::to_value(&session).unwrap();

    let outcomes = [
        orchestrator.generate_brd(&mut session, "", "").await.unwrap(),
        orchestrator.generate_java(&mut session).await.unwrap(),
        orchestrator.evaluate_and_optimize(&mut session).await.unwrap(),
        orchestrator.refine_enterprise(&mut session).await.unwrap(),
    ];

    let warnings: Vec<&str> = outcomes.iter().map(warning_of).collect();
    assert_eq!(
        warnings,
        vec![
            "Please enter some COBOL code.",
            "Please generate a BRD first.",
            "Please generate Java code first.",
            "Please evaluate and optimize the Java code first.",
        ]
    );
    assert_eq!(serde_json::to_value(&session).unwrap(), before);
    assert_eq!(llm.call_count(), 0);
}

#[tokio::test]
async fn refine_requires_optimization_even_when_java_exists() {
    let llm = Arc::new(ScriptedCompletion::new(&["analysis", "brd", "java"]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("refine-early");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    orchestrator.generate_java(&mut session).await.unwrap();
    let outcome = orchestrator.refine_enterprise(&mut session).await.unwrap();

    assert_eq!(
        warning_of(&outcome),
        "Please evaluate and optimize the Java code first."
    );
    assert_eq!(session.java_output.as_deref(), Some("java"));
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn rerunning_brd_overwrites_previous_output() {
    let llm = Arc::new(ScriptedCompletion::new(&["a1", "brd-1", "a2", "brd-2"]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("rerun");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    assert_eq!(session.brd_output.as_deref(), Some("brd-1"));

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    assert_eq!(session.brd_output.as_deref(), Some("brd-2"));
    assert_eq!(session.analysis_output.as_deref(), Some("a2"));
    assert_eq!(llm.call_count(), 4);
}

#[tokio::test]
async fn level_and_original_snapshot_follow_the_sequence() {
    let llm = Arc::new(ScriptedCompletion::new(&[
        "analysis", "brd", "java-1", "java-2", "eval-1", "opt-1", "eval-2", "opt-2", "ent-1",
    ]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("levels");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    orchestrator.generate_java(&mut session).await.unwrap();
    assert_eq!(session.optimization_level, None);
    assert_eq!(session.original_java_output.as_deref(), Some("java-1"));

    orchestrator.generate_java(&mut session).await.unwrap();
    assert_eq!(session.java_output.as_deref(), Some("java-2"));
    assert_eq!(session.optimization_level, None);

    orchestrator.evaluate_and_optimize(&mut session).await.unwrap();
    assert_eq!(session.optimization_level, Some(OptimizationLevel::Optimized));
    assert_eq!(session.evaluation_report.as_deref(), Some("eval-1"));
    assert_eq!(session.java_output.as_deref(), Some("opt-1"));

    orchestrator.evaluate_and_optimize(&mut session).await.unwrap();
    assert_eq!(session.optimization_level, Some(OptimizationLevel::Optimized));
    assert_eq!(session.java_output.as_deref(), Some("opt-2"));

    orchestrator.refine_enterprise(&mut session).await.unwrap();
    assert_eq!(session.optimization_level, Some(OptimizationLevel::Enterprise));
    assert_eq!(session.original_java_output.as_deref(), Some("java-1"));
    assert_eq!(session.state(), PipelineState::JavaEnterpriseRefined);
}

#[tokio::test]
async fn optimization_prompt_sees_evaluation_and_prior_java() {
    let llm = Arc::new(ScriptedCompletion::new(&[
        "analysis", "brd", "class Legacy {}", "GAP: file io missing", "opt",
    ]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("prompts");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    orchestrator.generate_java(&mut session).await.unwrap();
    orchestrator.evaluate_and_optimize(&mut session).await.unwrap();

    let requests = llm.requests.lock().unwrap();
    let optimize = &requests[4][1].content;
    assert!(optimize.contains("Evaluation Report:\nGAP: file io missing"));
    assert!(optimize.contains("class Legacy {}"));
    assert!(optimize.contains("PROGRAM-ID. PAYROLL."));
    assert!(requests[4][0].content.starts_with("You are Java Code Optimizer."));
}

#[tokio::test]
async fn full_sequence_ends_with_enterprise_download() {
    let llm = Arc::new(ScriptedCompletion::new(&[
        "T-ANALYSIS",
        "T-BRD",
        "T-JAVA",
        "T-EVAL",
        "T-OPT",
        "T-REFINE",
    ]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("full");

    let outcomes = orchestrator
        .run_through(&mut session, COBOL, "", StageId::RefineEnterprise)
        .await
        .into_result()
        .unwrap();

    assert_eq!(outcomes.len(), 4);
    assert!(outcomes.iter().all(StageOutcome::is_completed));
    assert_eq!(session.java_output.as_deref(), Some("T-REFINE"));
    assert_eq!(session.original_java_output.as_deref(), Some("T-JAVA"));
    let artifact = java_artifact(&session).unwrap();
    assert_eq!(artifact.filename, "Enterprise_Java_Implementation.java");
    assert_eq!(artifact.bytes, b"T-REFINE");
    assert_eq!(llm.call_count(), 6);
}

#[tokio::test]
async fn run_through_stops_at_requested_stage_and_at_warnings() {
    let llm = Arc::new(ScriptedCompletion::new(&["a", "b", "j"]));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("partial");

    let outcomes = orchestrator
        .run_through(&mut session, COBOL, "", StageId::GenerateJava)
        .await
        .into_result()
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(session.state(), PipelineState::JavaGenerated);

    let mut fresh = Session::new("blank");
    let outcomes = orchestrator
        .run_through(&mut fresh, " ", "", StageId::RefineEnterprise)
        .await
        .into_result()
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(warning_of(&outcomes[0]), EMPTY_SOURCE_WARNING);
    assert_eq!(llm.call_count(), 3);
}

#[tokio::test]
async fn run_through_keeps_completed_stages_when_a_later_one_fails() {
    // brd and java succeed; evaluation fails
    let llm = Arc::new(ScriptedCompletion::failing_at(&["a", "b", "j"], 3));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("partial-failure");

    let run = orchestrator
        .run_through(&mut session, COBOL, "", StageId::RefineEnterprise)
        .await;

    assert_eq!(run.outcomes.len(), 2);
    assert!(run.outcomes.iter().all(StageOutcome::is_completed));
    assert!(matches!(
        run.failure,
        Some(PipelineError::Model { ref task, .. }) if task == "java_evaluation"
    ));
    assert_eq!(session.state(), PipelineState::JavaGenerated);
    assert!(run.into_result().is_err());
}

#[tokio::test]
async fn model_failure_propagates_without_partial_capture() {
    // analysis, brd, java succeed; evaluation fails
    let llm = Arc::new(ScriptedCompletion::failing_at(
        &["analysis", "brd", "java", "never"],
        3,
    ));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("failure");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    orchestrator.generate_java(&mut session).await.unwrap();
    let err = orchestrator
        .evaluate_and_optimize(&mut session)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Model { ref task, .. } if task == "java_evaluation"));
    assert!(session.evaluation_report.is_none());
    assert!(session.optimized_java_output.is_none());
    assert_eq!(session.java_output.as_deref(), Some("java"));
    assert_eq!(session.brd_output.as_deref(), Some("brd"));
    assert_eq!(llm.call_count(), 4);
}

#[tokio::test]
async fn failure_in_second_brd_task_keeps_earlier_brd() {
    let llm = Arc::new(ScriptedCompletion::failing_at(&["a1", "brd-1", "a2"], 3));
    let orchestrator = Orchestrator::new(llm.clone());
    let mut session = Session::new("brd-failure");

    orchestrator.generate_brd(&mut session, COBOL, "").await.unwrap();
    let result = orchestrator.generate_brd(&mut session, "NEW SOURCE", "").await;

    assert!(result.is_err());
    assert_eq!(session.brd_output.as_deref(), Some("brd-1"));
    assert_eq!(session.analysis_output.as_deref(), Some("a1"));
    assert_eq!(session.cobol_source.as_deref(), Some(COBOL));
}

#[tokio::test]
async fn events_describe_stage_progress() {
    let (tx, mut rx) = mpsc::channel(32);
    let llm = Arc::new(ScriptedCompletion::new(&["j"]));
    let orchestrator = Orchestrator::new(llm).with_events(tx);
    let mut session = Session::new("events");
    session.record_brd(COBOL, "", "analysis", "brd");

    orchestrator.generate_java(&mut session).await.unwrap();
    orchestrator.refine_enterprise(&mut session).await.unwrap();
    drop(orchestrator);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert!(matches!(&events[0], PipelineEvent::StageStarted { stage } if stage == "generate_java"));
    assert!(matches!(&events[1], PipelineEvent::TaskStarted { message, .. }
        if message.starts_with("Creating complete Java equivalent")));
    assert!(matches!(&events[2], PipelineEvent::TaskCompleted { output_chars: 1, .. }));
    assert!(matches!(&events[3], PipelineEvent::StageCompleted { level: None, .. }));
    assert!(matches!(&events[4], PipelineEvent::StageSkipped { stage, .. } if stage == "refine_enterprise"));
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn failed_stage_emits_failure_event() {
    let (tx, mut rx) = mpsc::channel(32);
    let orchestrator = Orchestrator::new(Arc::new(ScriptedCompletion::new(&[]))).with_events(tx);
    let mut session = Session::new("events-fail");

    assert!(orchestrator.generate_brd(&mut session, COBOL, "").await.is_err());
    drop(orchestrator);

    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    match last {
        Some(PipelineEvent::StageFailed { stage, error }) => {
            assert_eq!(stage, "generate_brd");
            assert!(error.contains("cobol_analysis"));
        }
        other => panic!("unexpected final event: {other:?}"),
    }
}
