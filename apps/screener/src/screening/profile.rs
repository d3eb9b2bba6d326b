//! Profile Extractor — one generative call per resume, parsed into a
//! structured candidate profile.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{LlmError, TextGenerator};
use crate::screening::prompts::PROFILE_PROMPT_TEMPLATE;

/// Sentinel carried when a labeled field cannot be located in the reply.
/// Content-level parse failure is local: it never aborts the run.
pub const FIELD_NOT_FOUND: &str = "not found";

// The three extractions are independent: one failing never blocks the
// others. The summary runs until the Name label or end-of-text; the name is
// the remainder of its labeled line; the email must match local@domain.
static SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)Summary:\s*(.*?)\s*(?:\nName:|\z)").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Name:\s*(.+)$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Email:\s*([a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+)").unwrap()
});

/// Structured profile derived from one resume via one generative call.
///
/// `email: None` encodes the sentinel: the profile is non-actionable and
/// must never reach scoring or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: Option<String>,
    pub summary: String,
}

impl CandidateProfile {
    /// An actionable profile has a parseable email and a real summary to
    /// embed. Anything else is excluded before scoring.
    pub fn is_actionable(&self) -> bool {
        self.email.is_some() && self.summary != FIELD_NOT_FOUND
    }
}

/// Sends the normalized resume text to the generative service and parses
/// the fixed-format reply. Transport failures surface as `LlmError`; parse
/// failures degrade to sentinels instead.
pub async fn extract_profile(
    generator: &dyn TextGenerator,
    normalized_resume: &str,
) -> Result<CandidateProfile, LlmError> {
    let prompt = PROFILE_PROMPT_TEMPLATE.replace("{resume_text}", normalized_resume);
    let reply = generator.generate(&prompt).await?;
    Ok(parse_profile_reply(&reply))
}

/// Parses the three labeled fields out of a free-text service reply.
pub fn parse_profile_reply(reply: &str) -> CandidateProfile {
    let summary = SUMMARY_RE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FIELD_NOT_FOUND.to_string());

    let name = NAME_RE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FIELD_NOT_FOUND.to_string());

    let email = EMAIL_RE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    debug!(
        has_email = email.is_some(),
        summary_found = summary != FIELD_NOT_FOUND,
        "parsed profile reply"
    );

    CandidateProfile {
        name,
        email,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED_REPLY: &str = "Summary: Backend engineer with six years of Python \
and distributed systems experience, including Kafka pipelines and Kubernetes deployments.\n\
Name: Jane Doe\n\
Email: jane.doe@example.com";

    #[test]
    fn test_parses_well_formed_reply() {
        let profile = parse_profile_reply(WELL_FORMED_REPLY);
        assert_eq!(profile.name, "Jane Doe");
        assert_eq!(profile.email.as_deref(), Some("jane.doe@example.com"));
        assert!(profile.summary.starts_with("Backend engineer"));
        assert!(profile.is_actionable());
    }

    #[test]
    fn test_multiline_summary_terminates_at_name_label() {
        let reply = "Summary: First line of summary.\nStill the summary, second line.\n\
Name: John Smith\nEmail: john@corp.io";
        let profile = parse_profile_reply(reply);
        assert!(profile.summary.contains("second line"));
        assert!(!profile.summary.contains("John Smith"));
    }

    #[test]
    fn test_missing_email_label_yields_sentinel() {
        let reply = "Summary: Solid candidate.\nName: Jane Doe";
        let profile = parse_profile_reply(reply);
        assert_eq!(profile.email, None);
        assert!(!profile.is_actionable());
    }

    #[test]
    fn test_malformed_email_yields_sentinel() {
        let reply = "Summary: Solid candidate.\nName: Jane Doe\nEmail: not-an-address";
        let profile = parse_profile_reply(reply);
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_completely_unstructured_reply_degrades_to_sentinels() {
        let profile = parse_profile_reply("I could not process this resume, sorry.");
        assert_eq!(profile.summary, FIELD_NOT_FOUND);
        assert_eq!(profile.name, FIELD_NOT_FOUND);
        assert_eq!(profile.email, None);
        assert!(!profile.is_actionable());
    }

    #[test]
    fn test_empty_reply_yields_all_sentinels() {
        let profile = parse_profile_reply("");
        assert_eq!(profile.summary, FIELD_NOT_FOUND);
        assert_eq!(profile.name, FIELD_NOT_FOUND);
        assert_eq!(profile.email, None);
    }

    #[test]
    fn test_email_with_plus_and_subdomain_parses() {
        let reply = "Summary: Fine.\nName: A B\nEmail: a.b+jobs@mail.example.co.uk";
        let profile = parse_profile_reply(reply);
        assert_eq!(profile.email.as_deref(), Some("a.b+jobs@mail.example.co.uk"));
    }
}
