use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How many refinement passes have been applied to the Java output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Basic,
    Optimized,
    Enterprise,
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Basic => "basic",
            OptimizationLevel::Optimized => "optimized",
            OptimizationLevel::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for OptimizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(OptimizationLevel::Basic),
            "optimized" => Ok(OptimizationLevel::Optimized),
            "enterprise" => Ok(OptimizationLevel::Enterprise),
            other => Err(format!("Unknown optimization level: {other}")),
        }
    }
}

/// Position of a session in the linear stage sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Start,
    BrdGenerated,
    JavaGenerated,
    JavaEvaluatedOptimized,
    JavaEnterpriseRefined,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "START",
            PipelineState::BrdGenerated => "BRD_GENERATED",
            PipelineState::JavaGenerated => "JAVA_GENERATED",
            PipelineState::JavaEvaluatedOptimized => "JAVA_EVALUATED_OPTIMIZED",
            PipelineState::JavaEnterpriseRefined => "JAVA_ENTERPRISE_REFINED",
        };
        f.write_str(name)
    }
}

/// Session context holding every text entity produced so far.
///
/// Stage results are written through the `record_*` methods so the
/// snapshot and level rules hold no matter who drives the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cobol_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glossary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brd_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_output: Option<String>,
    /// First Java generation result, kept for the side-by-side view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_java_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_java_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise_java_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_level: Option<OptimizationLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lightweight listing entry for stored sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub state: PipelineState,
    pub optimization_level: Option<OptimizationLevel>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            cobol_source: None,
            glossary: None,
            analysis_output: None,
            brd_output: None,
            java_output: None,
            original_java_output: None,
            evaluation_report: None,
            optimized_java_output: None,
            enterprise_java_output: None,
            optimization_level: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Current state, derived from which outputs exist.
    pub fn state(&self) -> PipelineState {
        if self.enterprise_java_output.is_some()
            && self.optimization_level == Some(OptimizationLevel::Enterprise)
        {
            PipelineState::JavaEnterpriseRefined
        } else if self.optimized_java_output.is_some() {
            PipelineState::JavaEvaluatedOptimized
        } else if self.java_output.is_some() {
            PipelineState::JavaGenerated
        } else if self.brd_output.is_some() {
            PipelineState::BrdGenerated
        } else {
            PipelineState::Start
        }
    }

    /// Level used for display and naming; no level yet means basic.
    pub fn effective_level(&self) -> OptimizationLevel {
        self.optimization_level.unwrap_or(OptimizationLevel::Basic)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            state: self.state(),
            optimization_level: self.optimization_level,
            updated_at: self.updated_at,
        }
    }

    pub fn record_brd(
        &mut self,
        cobol_source: impl Into<String>,
        glossary: impl Into<String>,
        analysis: impl Into<String>,
        brd: impl Into<String>,
    ) {
        self.cobol_source = Some(cobol_source.into());
        self.glossary = Some(glossary.into());
        self.analysis_output = Some(analysis.into());
        self.brd_output = Some(brd.into());
        self.touch();
    }

    /// Store a Java generation result; the first one ever is also kept as the original.
    pub fn record_java(&mut self, java: impl Into<String>) {
        let java = java.into();
        if self.original_java_output.is_none() {
            self.original_java_output = Some(java.clone());
        }
        self.java_output = Some(java);
        self.touch();
    }

    pub fn record_optimization(
        &mut self,
        evaluation_report: impl Into<String>,
        optimized_java: impl Into<String>,
    ) {
        let optimized_java = optimized_java.into();
        self.evaluation_report = Some(evaluation_report.into());
        self.optimized_java_output = Some(optimized_java.clone());
        self.java_output = Some(optimized_java);
        self.optimization_level = Some(OptimizationLevel::Optimized);
        self.touch();
    }

    pub fn record_enterprise(&mut self, enterprise_java: impl Into<String>) {
        let enterprise_java = enterprise_java.into();
        self.enterprise_java_output = Some(enterprise_java.clone());
        self.java_output = Some(enterprise_java);
        self.optimization_level = Some(OptimizationLevel::Enterprise);
        self.touch();
    }
}
