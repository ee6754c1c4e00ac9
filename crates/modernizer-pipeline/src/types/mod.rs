pub mod persona;
pub mod stage;
pub mod task;

pub use persona::Persona;
pub use stage::{StageDefinition, StageId, StageOutcome, StageReport, Warning};
pub use task::{InputBinding, SubTask, TaskOutput};
