//! Terminal rendering for pipeline progress and results.

use colored::Colorize;
use modernizer_core::{JsonlStorage, PipelineEvent, Session, SessionSummary};
use modernizer_pipeline::{StageId, StageOutcome};
use tokio::sync::mpsc;

pub fn warning(message: &str) {
    println!("{}", format!("⚠️  {}", message).yellow());
}

pub fn success(message: &str) {
    println!("{}", format!("✅ {}", message).green());
}

pub fn progress(message: &str) {
    println!("{}", format!("⏳ {}", message).cyan());
}

pub fn heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "─".repeat(50).dimmed());
}

/// Print events as they arrive and append them to the session's event log.
pub async fn forward_events(
    mut rx: mpsc::Receiver<PipelineEvent>,
    storage: JsonlStorage,
    session_id: String,
) {
    while let Some(event) = rx.recv().await {
        print_event(&event);
        if let Err(e) = storage.append_event(&session_id, &event).await {
            log::warn!("[{}] Failed to record event: {}", session_id, e);
        }
    }
}

fn print_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::StageStarted { stage } => {
            println!("{}", format!("▶ {}", stage).cyan().bold());
        }
        PipelineEvent::TaskStarted { task, message, .. } => {
            if message.is_empty() {
                progress(task);
            } else {
                progress(message);
            }
        }
        PipelineEvent::TaskCompleted {
            task, output_chars, ..
        } => {
            println!(
                "{}",
                format!("   {} finished ({} chars)", task, output_chars).dimmed()
            );
        }
        PipelineEvent::StageCompleted { stage, level } => match level {
            Some(level) => success(&format!("{} completed (level: {})", stage, level)),
            None => success(&format!("{} completed", stage)),
        },
        // Warnings are printed from the outcome, errors once by main
        PipelineEvent::StageSkipped { .. } | PipelineEvent::StageFailed { .. } => {}
    }
}

pub fn print_outcomes(outcomes: &[StageOutcome]) {
    for outcome in outcomes {
        match outcome {
            StageOutcome::Skipped(skipped) => warning(&skipped.message),
            StageOutcome::Completed(report) => {
                if let Some(next) = next_command(report.stage) {
                    println!("{}", format!("   next: cobol-modernizer {}", next).dimmed());
                }
            }
        }
    }
}

fn next_command(stage: StageId) -> Option<&'static str> {
    match stage {
        StageId::GenerateBrd => Some("java"),
        StageId::GenerateJava => Some("optimize"),
        StageId::EvaluateAndOptimize => Some("refine"),
        StageId::RefineEnterprise => None,
    }
}

pub fn print_status(session: &Session) {
    heading(&format!("Session {}", session.id));
    println!("State:   {}", session.state());
    match session.optimization_level {
        Some(level) => println!("Level:   {}", level),
        None => println!("Level:   {}", "none".dimmed()),
    }
    println!("Updated: {}", session.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    print_stages(session);
}

pub fn print_stages(session: &Session) {
    for stage in StageId::all() {
        let definition = stage.definition();
        let availability = match stage.missing_prerequisite(session) {
            None => "available".green(),
            Some(reason) => reason.yellow(),
        };
        println!("{:<24} {}", definition.name.bold(), availability);
        println!("{:<24} {}", "", definition.description.dimmed());
    }
}

pub fn print_sessions(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("{}", "No sessions stored yet.".dimmed());
        return;
    }

    heading("Sessions");
    for summary in sessions {
        let level = summary
            .optimization_level
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<20} {:<26} {:<10} {}",
            summary.id,
            summary.state.to_string(),
            level,
            summary.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
}

/// Print a stored text, or a warning naming what is missing.
pub fn print_text(title: &str, text: Option<&str>, missing: &str) {
    match text {
        Some(text) => {
            heading(title);
            println!("{}", text);
        }
        None => warning(missing),
    }
}
