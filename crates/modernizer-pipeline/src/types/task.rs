//! Sub-task descriptors executed by the sequential runner

use serde::{Deserialize, Serialize};

use super::Persona;

/// Where a sub-task takes extra input from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputBinding {
    /// The prompt is self-contained
    Standalone,

    /// The full output of the previous sub-task is appended under `label`
    PreviousOutput { label: String },
}

/// One model request within a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    /// Short identifier used in logs and events
    pub name: String,
    pub persona: Persona,
    /// Prompt text, already filled with session entities
    pub description: String,
    pub expected_output: String,
    pub binding: InputBinding,
    /// Line shown to the user while the request is in flight
    pub progress_message: String,
}

impl SubTask {
    pub fn new(
        name: impl Into<String>,
        persona: Persona,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            persona,
            description: description.into(),
            expected_output: expected_output.into(),
            binding: InputBinding::Standalone,
            progress_message: String::new(),
        }
    }

    pub fn bind_previous(mut self, label: impl Into<String>) -> Self {
        self.binding = InputBinding::PreviousOutput {
            label: label.into(),
        };
        self
    }

    pub fn with_progress(mut self, message: impl Into<String>) -> Self {
        self.progress_message = message.into();
        self
    }

    /// Final prompt text given the previous sub-task's output, if any.
    ///
    /// Returns `None` when the task needs a previous output that does not exist.
    pub fn render_prompt(&self, previous: Option<&str>) -> Option<String> {
        let mut prompt = self.description.trim_end().to_string();

        if let InputBinding::PreviousOutput { label } = &self.binding {
            let previous = previous?;
            prompt.push_str("\n\n");
            prompt.push_str(label);
            prompt.push_str(":\n");
            prompt.push_str(previous);
        }

        prompt.push_str("\n\nExpected output: ");
        prompt.push_str(&self.expected_output);
        Some(prompt)
    }
}

/// Text produced by one sub-task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskOutput {
    pub task: String,
    pub output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Persona {
        Persona::new("Writer", "Write", "You write.")
    }

    #[test]
    fn standalone_prompt_ignores_previous_output() {
        let task = SubTask::new("draft", persona(), "Do the thing.\n", "A thing");
        let prompt = task.render_prompt(Some("earlier")).unwrap();
        assert_eq!(prompt, "Do the thing.\n\nExpected output: A thing");
    }

    #[test]
    fn bound_prompt_appends_previous_output_under_label() {
        let task = SubTask::new("draft", persona(), "Reformat.", "BRD")
            .bind_previous("COBOL Analysis Output");
        let prompt = task.render_prompt(Some("fact 1")).unwrap();
        assert_eq!(
            prompt,
            "Reformat.\n\nCOBOL Analysis Output:\nfact 1\n\nExpected output: BRD"
        );
    }

    #[test]
    fn bound_prompt_without_previous_output_is_none() {
        let task = SubTask::new("draft", persona(), "Reformat.", "BRD").bind_previous("Input");
        assert!(task.render_prompt(None).is_none());
    }
}
