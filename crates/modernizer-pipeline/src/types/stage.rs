//! Stage identifiers, catalogue entries and outcomes

use std::fmt;
use std::str::FromStr;

use modernizer_core::{OptimizationLevel, PipelineState, Session};
use serde::{Deserialize, Serialize};

use super::TaskOutput;

/// The four user-triggered transitions, in pipeline order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    GenerateBrd,
    GenerateJava,
    EvaluateAndOptimize,
    RefineEnterprise,
}

/// Static description of a stage, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: StageId,
    pub name: String,
    pub description: String,
    /// Stage whose output must exist first
    pub requires: Option<StageId>,
    /// State reached when the stage completes
    pub reaches: PipelineState,
}

impl StageId {
    pub fn all() -> [StageId; 4] {
        [
            StageId::GenerateBrd,
            StageId::GenerateJava,
            StageId::EvaluateAndOptimize,
            StageId::RefineEnterprise,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            StageId::GenerateBrd => "generate_brd",
            StageId::GenerateJava => "generate_java",
            StageId::EvaluateAndOptimize => "evaluate_and_optimize",
            StageId::RefineEnterprise => "refine_enterprise",
        }
    }

    pub fn definition(&self) -> StageDefinition {
        let (description, requires, reaches) = match self {
            StageId::GenerateBrd => (
                "Analyze the COBOL source and draft a Business Requirements Document",
                None,
                PipelineState::BrdGenerated,
            ),
            StageId::GenerateJava => (
                "Generate a complete Java implementation from the COBOL source and the BRD",
                Some(StageId::GenerateBrd),
                PipelineState::JavaGenerated,
            ),
            StageId::EvaluateAndOptimize => (
                "Evaluate the Java code against the COBOL source and optimize it",
                Some(StageId::GenerateJava),
                PipelineState::JavaEvaluatedOptimized,
            ),
            StageId::RefineEnterprise => (
                "Apply enterprise-grade refinements to the optimized Java code",
                Some(StageId::EvaluateAndOptimize),
                PipelineState::JavaEnterpriseRefined,
            ),
        };

        StageDefinition {
            id: *self,
            name: self.name().to_string(),
            description: description.to_string(),
            requires,
            reaches,
        }
    }

    /// Warning to show when the session lacks this stage's required input.
    ///
    /// BRD generation depends on user input rather than session state, so it
    /// is checked by the orchestrator against the supplied source instead.
    pub fn missing_prerequisite(&self, session: &Session) -> Option<&'static str> {
        match self {
            StageId::GenerateBrd => None,
            StageId::GenerateJava if session.brd_output.is_none() => {
                Some("Please generate a BRD first.")
            }
            StageId::EvaluateAndOptimize if session.java_output.is_none() => {
                Some("Please generate Java code first.")
            }
            StageId::RefineEnterprise if session.optimized_java_output.is_none() => {
                Some("Please evaluate and optimize the Java code first.")
            }
            _ => None,
        }
    }

    pub fn is_available(&self, session: &Session) -> bool {
        self.missing_prerequisite(session).is_none()
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "brd" | "generate_brd" => Ok(StageId::GenerateBrd),
            "java" | "generate_java" => Ok(StageId::GenerateJava),
            "optimize" | "evaluate" | "evaluate_and_optimize" => Ok(StageId::EvaluateAndOptimize),
            "refine" | "enterprise" | "refine_enterprise" => Ok(StageId::RefineEnterprise),
            other => Err(format!("Unknown stage: {other}")),
        }
    }
}

/// A stage rejected by its guard check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Warning {
    pub stage: StageId,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a completed stage produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: StageId,
    /// Every sub-task output, in execution order
    pub outputs: Vec<TaskOutput>,
    pub level: Option<OptimizationLevel>,
}

impl StageReport {
    /// Output of the last sub-task, which is what the stage stores as its result
    pub fn final_output(&self) -> &str {
        self.outputs
            .last()
            .map(|o| o.output.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub enum StageOutcome {
    Completed(StageReport),
    Skipped(Warning),
}

impl StageOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StageOutcome::Completed(_))
    }

    pub fn warning(&self) -> Option<&Warning> {
        match self {
            StageOutcome::Skipped(warning) => Some(warning),
            StageOutcome::Completed(_) => None,
        }
    }
}
