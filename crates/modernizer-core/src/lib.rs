//! modernizer-core - Core types shared by the modernization pipeline crates
//!
//! - `session` - the session context (entity table), pipeline state and events
//! - `config` - provider/model configuration loaded from file and environment
//! - `paths` - application data locations
//! - `storage` - JSON session snapshots and JSONL event logs

pub mod config;
pub mod paths;
pub mod session;
pub mod storage;

pub use config::Config;
pub use session::{
    Message, OptimizationLevel, PipelineEvent, PipelineState, Role, Session, SessionSummary,
};
pub use storage::{JsonlStorage, StorageError};
