// All LLM prompt constants for the screening pipeline.
//
// The profile prompt and the reply parser in `profile.rs` are a contract:
// the parser regex-matches the three labels this prompt demands, so changing
// the wording here requires updating the parser in lock-step.

/// Profile extraction prompt template. Replace `{resume_text}` before
/// sending. Demands exactly three labeled fields in a fixed layout.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"You are a professional resume parser and evaluator.
Given the resume below, perform the following tasks:
1. Write a professional and concise paragraph summarizing the candidate's qualifications, technical skills, work experience, certifications, and project experience. This summary should be suitable for comparing against a job description.
2. Extract the candidate's full name.
3. Extract the candidate's email address.
Return the output in the following format:
Summary: <one-paragraph summary here>
Name: <candidate name here>
Email: <candidate email here>
Resume:
{resume_text}"#;

/// Job-description summary prompt template. Replace `{jd_text}` before
/// sending. Output is the run's fixed comparison baseline, so the
/// instruction bounds the length and forbids commentary.
pub const JD_SUMMARY_PROMPT_TEMPLATE: &str = r#"Condense the following job description into one short descriptive paragraph of 40 to 150 words.
Cover the role, the required technical skills, and the experience sought.
Return only the paragraph, with no preamble, labels, or commentary.
Job description:
{jd_text}"#;
