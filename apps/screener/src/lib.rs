//! Resume screening service: scores resume documents against a job
//! description with generative profile extraction and embedding similarity,
//! then notifies and records qualifying candidates.
//!
//! One pipeline core (`screening::pipeline`) sits behind two thin drivers:
//! the `screener-api` HTTP server and the `shortlist` console tool.

pub mod config;
pub mod db;
pub mod errors;
pub mod llm_client;
pub mod notify;
pub mod recorder;
pub mod routes;
pub mod screening;
pub mod state;
