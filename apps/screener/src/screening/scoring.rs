//! Scorer and Decision Policy — cosine similarity between the JD baseline
//! and a candidate embedding, gated by the run's strictness threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cosine similarity in [-1, 1].
///
/// Degenerate cases return 0 instead of NaN or an error: a zero vector has
/// no defined direction, and a dimension mismatch means the inputs are not
/// comparable. A 0 score never shortlists under either threshold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Run-level strictness. Selected once per run; fixed for every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreeningMode {
    Strict,
    Relaxed,
}

impl ScreeningMode {
    /// Minimum cosine similarity required to shortlist.
    pub fn threshold(self) -> f32 {
        match self {
            ScreeningMode::Strict => 0.70,
            ScreeningMode::Relaxed => 0.40,
        }
    }
}

impl fmt::Display for ScreeningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreeningMode::Strict => f.write_str("strict"),
            ScreeningMode::Relaxed => f.write_str("relaxed"),
        }
    }
}

impl FromStr for ScreeningMode {
    type Err = String;

    /// Accepts the mode names plus the numeric selectors the original web
    /// form used (1 = highly skilled only, 2 = moderate and highly skilled).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "1" => Ok(ScreeningMode::Strict),
            "relaxed" | "2" => Ok(ScreeningMode::Relaxed),
            other => Err(format!(
                "unknown screening mode '{other}' (expected 'strict' or 'relaxed')"
            )),
        }
    }
}

/// Scored → Shortlisted iff score ≥ threshold(mode). Monotonic in score.
pub fn is_shortlisted(score: f32, mode: ScreeningMode) -> bool {
    score >= mode.threshold()
}
