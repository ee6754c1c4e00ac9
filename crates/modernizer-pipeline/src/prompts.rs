//! Prompt templates and personas for every stage.
//!
//! Templates are plain text; [`crate::stages`] fills them with session entities.

use crate::types::Persona;

/// Sections the BRD drafting prompt asks for, in document order
pub const BRD_SECTIONS: [&str; 8] = [
    "Functional Overview",
    "Inputs and Outputs",
    "Business Rules",
    "Error Handling",
    "Dependencies",
    "Technical Constraints",
    "Glossary",
    "Process Flow Visualization",
];

/// Criteria the evaluation task rates as Complete, Partial or Missing
pub const EVALUATION_CRITERIA: [(&str, &str); 8] = [
    (
        "File Input/Output",
        "Check if all file operations in COBOL are properly implemented in Java",
    ),
    (
        "Business Logic",
        "Verify all calculations, formulas, and business rules are correctly translated",
    ),
    (
        "Error Handling",
        "Ensure all error conditions and exception handling are implemented",
    ),
    (
        "Data Structures",
        "Confirm all COBOL data structures have equivalent Java representations",
    ),
    (
        "Control Flow",
        "Validate that program flow, loops, and conditionals match the COBOL logic",
    ),
    (
        "Report Generation",
        "Check if all reporting functionality is properly implemented",
    ),
    (
        "Data Persistence",
        "Verify that data storage and retrieval mechanisms are equivalent",
    ),
    (
        "Validation Rules",
        "Ensure all input validation and business rule validations are implemented",
    ),
];

pub const NOT_DEFINED_MARKER: &str = "Not explicitly defined in source code.";

pub const ANALYSIS_LABEL: &str = "COBOL Analysis Output";
pub const EVALUATION_LABEL: &str = "Evaluation Report";

pub fn cobol_analyst() -> Persona {
    Persona::new(
        "COBOL Analyst",
        "Analyze COBOL source code and extract key details for a BRD",
        "You are a senior business analyst skilled in understanding legacy COBOL systems and \
         translating them into modern documentation.",
    )
}

pub fn brd_writer() -> Persona {
    Persona::new(
        "BRD Writer",
        "Draft a professional BRD section from a COBOL analysis",
        "You are an experienced documentation specialist known for creating precise business \
         requirement documents.",
    )
}

pub fn java_migration_expert() -> Persona {
    Persona::new(
        "COBOL to Java Migration Expert",
        "Generate complete production-ready Java code that exactly replicates all COBOL functionality",
        "You are a senior software architect specializing in legacy modernization with 15+ years \
         of experience converting COBOL systems to Java. You understand both languages deeply and \
         can create exact functional equivalents while using modern Java practices.",
    )
}

pub fn conversion_evaluator() -> Persona {
    Persona::new(
        "COBOL-Java Conversion Evaluator",
        "Evaluate and identify gaps in Java code converted from COBOL",
        "You are a technical lead with expertise in both COBOL and Java, specializing in \
         evaluating the completeness and accuracy of code migrations.",
    )
}

pub fn java_optimizer() -> Persona {
    Persona::new(
        "Java Code Optimizer",
        "Enhance Java code to fully implement all COBOL functionality",
        "You are a senior Java developer with deep knowledge of COBOL to Java migration \
         patterns, focused on ensuring functional equivalence and code quality.",
    )
}

pub fn enterprise_refiner() -> Persona {
    Persona::new(
        "Enterprise Java Implementation Expert",
        "Create complete, production-ready Java code with no gaps or skeleton code",
        "You are a principal architect specializing in enterprise Java applications with \
         expertise in financial systems and COBOL migration projects. You are known for \
         delivering 100% complete, compilable code with no TODOs or implementation gaps.",
    )
}

pub fn analysis_prompt(cobol_source: &str, glossary: &str) -> String {
    format!(
        "You are a senior Business Analyst with expertise in COBOL programs and Business \
Requirement Documents (BRDs).
Your task is to analyze the COBOL source code provided and extract relevant details needed for \
a clear and accurate BRD.

ONLY use the information explicitly mentioned in the COBOL source code and the business glossary.
DO NOT make assumptions or include any information that is not present in the input data.

Focus on:
- Identifying business rules, especially critical ones as per business glossary or comment tags
- Input and output data structures, including key fields and their purpose
- Key calculations or transformations
- Conditions or validations present in the logic, including any error messages or exception \
handling mechanisms
- System interfaces, dependencies, or architectural notes
- Any performance considerations or technical constraints mentioned in the COBOL code

You are not expected to reverse-engineer the full logic, only to summarize observable behavior \
from the COBOL code to be used in a BRD context.

Be clear and concise. When something is ambiguous or undefined, mention it as \
\"{NOT_DEFINED_MARKER}\"

Respond only in plain English.

COBOL Code:
{cobol_source}

Glossary:
{glossary}"
    )
}

pub fn brd_drafting_prompt() -> String {
    let annotations = [
        "",
        " (include key fields if available)",
        " (highlight critical ones if tagged)",
        " (include validations and messages)",
        " (if any)",
        " (like performance considerations)",
        " (if referenced terms are used)",
        " (describe the flow in plain steps)",
    ];

    let mut sections = String::new();
    for (section, note) in BRD_SECTIONS.iter().zip(annotations) {
        sections.push_str("- ");
        sections.push_str(section);
        sections.push_str(note);
        sections.push('\n');
    }

    format!(
        "You are a documentation expert tasked with converting the technical analysis into a \
formal Business Requirements Document (BRD) section.

ONLY use the content provided in the \"{ANALYSIS_LABEL}\" below.
Do NOT introduce any new functionality or inferred behavior.
Avoid hallucinations or speculative assumptions.
Stick strictly to what is mentioned in the analysis.

Structure your BRD section to include:
{sections}
Maintain a professional tone and avoid unnecessary technical jargon.

Use the {ANALYSIS_LABEL} from the previous analyst to create the BRD section."
    )
}

pub fn java_generation_prompt(cobol_source: &str, brd_output: &str) -> String {
    format!(
        "Generate a COMPLETE and DETAILED Java code implementation that is functionally \
equivalent to the provided COBOL code.

COBOL Code:
{cobol_source}

BRD Output:
{brd_output}

Follow these guidelines:
1. Create a COMPLETE end-to-end Java implementation with ALL necessary classes, methods, and files
2. Include ALL business logic, calculations, and data processing from the COBOL code
3. Implement proper error handling for all operations
4. Include detailed comments explaining the code and its relationship to the original COBOL
5. Use modern Java best practices and appropriate design patterns
6. Create proper data structures to represent all COBOL records and variables
7. Implement ALL validation rules and business logic exactly as in the COBOL code
8. Include a main class that demonstrates the execution flow
9. Ensure all file operations are properly implemented if present in the COBOL code
10. DO NOT provide simplified or sample code - implement the FULL functionality

Your response should be production-ready Java code that could directly replace the COBOL \
implementation."
    )
}

fn evaluation_criteria_text() -> String {
    let mut text = String::from(
        "Evaluate the Java code against the original COBOL code for the following aspects:\n\n",
    );
    for (idx, (name, check)) in EVALUATION_CRITERIA.iter().enumerate() {
        text.push_str(&format!("{}. {}: {}\n", idx + 1, name, check));
    }
    text.push_str(
        "\nFor each aspect, provide:\n\
         - Status: Complete, Partial, or Missing\n\
         - Specific gaps or issues identified\n\
         - Recommendations for improvement\n\n\
         Format your evaluation as a structured report with clear sections for each aspect.",
    );
    text
}

pub fn evaluation_prompt(cobol_source: &str, java_output: &str) -> String {
    format!(
        "Evaluate the Java code against the original COBOL code using the criteria below.

COBOL Code:
{cobol_source}

Java Code:
{java_output}

Evaluation Criteria:
{criteria}

Provide a detailed evaluation report identifying specific gaps and issues.",
        criteria = evaluation_criteria_text()
    )
}

pub fn optimization_prompt(cobol_source: &str, java_output: &str) -> String {
    format!(
        "Based on the evaluation report below, optimize the Java code to address all identified \
gaps and issues.

Original Java Code:
{java_output}

Original COBOL Code:
{cobol_source}

Focus on implementing missing functionality and fixing incomplete aspects while maintaining the \
existing correct implementations.

Ensure the optimized code is complete, accurate, and follows Java best practices.

Return the complete optimized Java code implementation."
    )
}

const ENTERPRISE_CRITERIA: &str = r#"Refine the Java code to address these critical enterprise requirements:

1. CRITICAL: Complete All Class Definitions
   - Implement ALL referenced classes (Employee, Timecard, PayrollReport, etc.)
   - Include ALL fields, constructors, getters/setters, and methods
   - Ensure no "skeleton" or commented-out code remains

2. CRITICAL: Implement Complete COBOL Record Parsing
   - Create parsers for ALL fixed-length COBOL record formats
   - Implement proper field extraction with exact positioning
   - Handle COMP-3 packed decimal fields correctly
   - Example implementation required:
     ```java
     public static Employee parseCobolEmployee(String record) {
         if (record.length() < 120) {
             throw new IllegalArgumentException("Invalid employee record length");
         }

         String id = record.substring(0, 6).trim();
         String name = record.substring(6, 31).trim();
         BigDecimal hourlyRate = parseComp3(record, 31, 5); // COMP-3 parsing
         int exemptions = Integer.parseInt(record.substring(36, 38).trim());
         String state = record.substring(38, 40).trim();

         return new Employee(id, name, hourlyRate, exemptions, state);
     }
     ```

3. Fix Exception Handling Anti-Patterns
   - Create custom exception classes for different error scenarios
   - Either log OR throw exceptions, not both
   - Implement proper exception hierarchy
   - Example implementation required:
     ```java
     public void loadEmployeesFromFile(String filename) throws PayrollProcessingException {
         try {
             // ... file processing
         } catch (IOException e) {
             String message = "Failed to load employees from: " + filename;
             LOGGER.error(message, e);
             throw new PayrollProcessingException(message, e);
         }
     }
     ```

4. Data Compatibility: Implement proper data readers/writers that can directly work with COBOL data files
   - Add support for EBCDIC encoding if needed
   - Handle fixed-length records properly
   - Implement proper data type conversions

5. Financial Precision: Replace all floating-point calculations with proper decimal handling
   - Use BigDecimal for all monetary calculations
   - Ensure exact decimal precision matching COBOL's COMP-3 fields
   - Implement proper rounding modes for financial calculations

6. Performance Optimization:
   - Replace List iterations with HashMap lookups for better performance
   - Optimize file I/O operations for large datasets
   - Add appropriate caching mechanisms

7. Add Unit Tests:
   - Include JUnit test framework setup
   - Add test cases for critical business logic
   - Include sample test data

Return the complete enterprise-ready Java implementation with NO skeleton code, NO commented-out functionality, and ALL classes fully implemented."#;

pub fn enterprise_prompt(cobol_source: &str, java_output: &str) -> String {
    format!(
        "Refine the optimized Java code to enterprise production standards.

Current Java Code:
{java_output}

Original COBOL Code:
{cobol_source}

Enterprise Criteria:
{ENTERPRISE_CRITERIA}

CRITICAL IMPLEMENTATION REQUIREMENTS:
1. DO NOT leave any commented-out code or TODOs in your implementation
2. Implement ALL class definitions completely (Employee, Timecard, PayrollReport, etc.)
3. Implement ALL COBOL record parsing logic with exact field positions
4. Fix ALL exception handling to follow best practices
5. Ensure ALL business logic is fully implemented, not just described

Your implementation MUST be complete, compilable, and ready for production use.

Provide a complete enterprise-grade Java implementation that addresses all the criteria above."
    )
}
