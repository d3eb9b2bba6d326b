//! Summarizer — condenses the job description into the short paragraph that
//! becomes the run's fixed comparison baseline.

use crate::llm_client::{LlmError, TextGenerator};
use crate::screening::prompts::JD_SUMMARY_PROMPT_TEMPLATE;

/// Summarizes a job description into one bounded paragraph. The client
/// decodes with temperature 0, so an unchanged JD yields a stable summary
/// across runs.
pub async fn summarize_jd(
    generator: &dyn TextGenerator,
    jd_text: &str,
) -> Result<String, LlmError> {
    let prompt = JD_SUMMARY_PROMPT_TEMPLATE.replace("{jd_text}", jd_text);
    let summary = generator.generate(&prompt).await?;
    Ok(summary.trim().to_string())
}
