pub mod events;
pub mod message;
pub mod types;

pub use events::PipelineEvent;
pub use message::{Message, Role};
pub use types::{OptimizationLevel, PipelineState, Session, SessionSummary};
