//! Sub-task lists for each stage, filled with session entities.

use crate::prompts;
use crate::types::SubTask;

pub fn brd_tasks(cobol_source: &str, glossary: &str) -> Vec<SubTask> {
    let analysis = SubTask::new(
        "cobol_analysis",
        prompts::cobol_analyst(),
        prompts::analysis_prompt(cobol_source, glossary),
        "COBOL Analysis Output",
    )
    .with_progress("Analyzing COBOL source for business facts...");

    let drafting = SubTask::new(
        "brd_drafting",
        prompts::brd_writer(),
        prompts::brd_drafting_prompt(),
        "Final BRD Section",
    )
    .bind_previous(prompts::ANALYSIS_LABEL)
    .with_progress("Drafting the BRD from the analysis...");

    vec![analysis, drafting]
}

pub fn java_tasks(cobol_source: &str, brd_output: &str) -> Vec<SubTask> {
    vec![SubTask::new(
        "java_generation",
        prompts::java_migration_expert(),
        prompts::java_generation_prompt(cobol_source, brd_output),
        "Complete Java implementation with all business logic and functionality",
    )
    .with_progress(
        "Creating complete Java equivalent with all business logic and functionality from the \
         COBOL code...",
    )]
}

pub fn evaluation_tasks(cobol_source: &str, java_output: &str) -> Vec<SubTask> {
    let evaluate = SubTask::new(
        "java_evaluation",
        prompts::conversion_evaluator(),
        prompts::evaluation_prompt(cobol_source, java_output),
        "Detailed evaluation report of Java code",
    )
    .with_progress("Analyzing code for gaps and issues...");

    let optimize = SubTask::new(
        "java_optimization",
        prompts::java_optimizer(),
        prompts::optimization_prompt(cobol_source, java_output),
        "Optimized Java code implementation",
    )
    .bind_previous(prompts::EVALUATION_LABEL)
    .with_progress("Implementing improvements based on evaluation...");

    vec![evaluate, optimize]
}

pub fn enterprise_tasks(cobol_source: &str, java_output: &str) -> Vec<SubTask> {
    vec![SubTask::new(
        "enterprise_refinement",
        prompts::enterprise_refiner(),
        prompts::enterprise_prompt(cobol_source, java_output),
        "Enterprise-grade Java implementation",
    )
    .with_progress("Enhancing code with production-ready features for enterprise deployment...")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputBinding;

    #[test]
    fn two_task_stages_bind_second_task_to_first() {
        for tasks in [brd_tasks("C", "G"), evaluation_tasks("C", "J")] {
            assert_eq!(tasks.len(), 2);
            assert_eq!(tasks[0].binding, InputBinding::Standalone);
            assert!(matches!(tasks[1].binding, InputBinding::PreviousOutput { .. }));
        }
    }

    #[test]
    fn single_task_stages_are_standalone() {
        for tasks in [java_tasks("C", "B"), enterprise_tasks("C", "J")] {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].binding, InputBinding::Standalone);
            assert!(!tasks[0].progress_message.is_empty());
        }
    }

    #[test]
    fn expected_outputs_describe_each_deliverable() {
        let expected: Vec<String> = [
            brd_tasks("C", "G"),
            java_tasks("C", "B"),
            evaluation_tasks("C", "J"),
            enterprise_tasks("C", "J"),
        ]
        .into_iter()
        .flatten()
        .map(|task| task.expected_output)
        .collect();

        assert_eq!(
            expected,
            [
                "COBOL Analysis Output",
                "Final BRD Section",
                "Complete Java implementation with all business logic and functionality",
                "Detailed evaluation report of Java code",
                "Optimized Java code implementation",
                "Enterprise-grade Java implementation",
            ]
        );
    }

    #[test]
    fn optimization_embeds_prior_java() {
        let tasks = evaluation_tasks("IDENTIFICATION DIVISION.", "class Payroll {}");
        assert!(tasks[1].description.contains("class Payroll {}"));
        assert!(tasks[1].description.contains("IDENTIFICATION DIVISION."));
        assert_eq!(tasks[1].persona.role, "Java Code Optimizer");
    }
}
