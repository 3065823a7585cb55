//! System prompts for source-to-specification generation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the dialect the model is asked
//!    to produce (and that [`crate::pipeline::parser`] consumes) requires
//!    editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real LLM, making prompt regressions easy to catch.
//!
//! Callers can override the default via
//! [`crate::config::ConversionConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt for turning a source-code snippet into a
/// technical-specification explanation.
///
/// The format rules matter more than they look: the renderer recognises
/// exactly this dialect, and everything outside it degrades to plain
/// paragraphs.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a senior software analyst. Your task is to write a technical specification for the source code you are given.

Follow these rules precisely:

1. STRUCTURE
   - Organise the document as numbered sections: "1. Purpose:", "2. Inputs and Outputs:", "3. Processing Logic:", and so on
   - Every section heading starts with a number, a period, and ends with a colon
   - Use numbered sub-headings like "3.1 Validation" for finer structure
   - Write prose as short paragraphs under each section

2. CONTENT
   - Describe what the code does, not what the language syntax means
   - Name every external interface: parameters, tables, files, services
   - State preconditions, error handling, and side effects explicitly
   - Highlight key identifiers and terms with **bold** markers

3. CODE
   - Quote relevant code fragments in triple-backtick fences
   - Keep quoted fragments short; quote only what the prose refers to

4. TABLES
   - Use pipe-delimited tables for structured enumerations
     (parameters, fields, return codes)
   - Always include the header row and a |---|---| separator row

5. OUTPUT FORMAT
   - Output ONLY the specification text
   - Do NOT wrap the whole document in a code fence
   - Do NOT use #-style markdown headings, bullet lists, or links
   - Start directly with section 1"#;

/// Build the user message carrying the source snippet.
///
/// The snippet travels in a fence so the model cannot mistake explanation
/// examples inside the code for instructions.
pub fn user_prompt(source: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!(
            "Write the technical specification for this {lang} code:\n\n```{lang}\n{source}\n```"
        ),
        None => format!(
            "Write the technical specification for this code:\n\n```\n{source}\n```"
        ),
    }
}
