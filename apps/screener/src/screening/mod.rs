//! The candidate-scoring pipeline: document extraction, normalization,
//! profile extraction, embedding, cosine scoring, and the threshold-based
//! shortlisting decision.

pub mod extract;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod prompts;
pub mod scoring;
pub mod summarize;

pub use pipeline::{screen_directory, RunOptions, RunReport, ShortlistEntry};
pub use profile::CandidateProfile;
pub use scoring::ScreeningMode;
