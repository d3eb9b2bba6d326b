//! Pipeline driver — runs one screening batch: summarize and embed the job
//! description once, then evaluate every resume in the corpus against it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Secret;
use crate::errors::ScreenError;
use crate::llm_client::{Embedder, TextGenerator};
use crate::notify::{Invitation, Notifier};
use crate::recorder::Recorder;
use crate::screening::extract::extract_document_text;
use crate::screening::normalize::normalize;
use crate::screening::profile::extract_profile;
use crate::screening::scoring::{cosine_similarity, is_shortlisted, ScreeningMode};
use crate::screening::summarize::summarize_jd;

/// Injected capabilities. Initialized once at process start and shared
/// read-only across runs; swapped for test doubles in pipeline tests.
#[derive(Clone)]
pub struct Services {
    pub generator: Arc<dyn TextGenerator>,
    pub embedder: Arc<dyn Embedder>,
    pub notifier: Arc<dyn Notifier>,
    pub recorder: Arc<dyn Recorder>,
}

/// Run-scoped configuration. Fixed for the whole run; the secret is opaque
/// and passed through to the Notifier untouched.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub job_role: String,
    pub sender: String,
    pub secret: Secret,
    pub mode: ScreeningMode,
    /// Accepted resume file extensions (lowercase, no leading dot).
    pub extensions: Vec<String>,
}

/// One accepted candidate. Created only when the score cleared the
/// threshold AND the invitation was delivered; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortlistEntry {
    pub name: String,
    pub email: String,
    pub score: f32,
    pub resume_file: String,
}

/// End-of-run accounting: every resume considered lands in exactly one
/// bucket.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub job_role: String,
    pub mode: ScreeningMode,
    pub considered: u32,
    pub excluded_unreadable: u32,
    pub excluded_insufficient_text: u32,
    pub excluded_incomplete_profile: u32,
    pub service_failures: u32,
    pub rejected: u32,
    pub notification_failures: u32,
    pub shortlisted: Vec<ShortlistEntry>,
}

/// Terminal state of one candidate's pass through the pipeline:
/// Extracted → {Skipped | Scored} → {Shortlisted | Rejected} →
/// {Notified | NotificationFailed}.
enum CandidateOutcome {
    Unreadable,
    InsufficientText,
    IncompleteProfile,
    ServiceFailed,
    Rejected { name: String, score: f32 },
    Shortlisted(ShortlistEntry),
    NotificationFailed { name: String, score: f32 },
}

/// Screens every resume in `resume_dir` against `jd_text`.
///
/// Sequential by design: one resume is fully evaluated (and conditionally
/// notified) before the next begins, giving exactly one generative call per
/// resume and at most one notification attempt per shortlisted candidate.
/// Per-resume failures are logged and counted; only configuration problems
/// and a failure to build the JD baseline abort the run.
pub async fn screen_directory(
    services: &Services,
    options: &RunOptions,
    jd_text: &str,
    resume_dir: &Path,
) -> Result<RunReport, ScreenError> {
    if jd_text.trim().is_empty() {
        return Err(ScreenError::Configuration(
            "job description is empty".to_string(),
        ));
    }

    let resume_files = list_resume_files(resume_dir, &options.extensions)?;

    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        role = %options.job_role,
        mode = %options.mode,
        resumes = resume_files.len(),
        "starting screening run"
    );

    // The comparison baseline: computed once, reused read-only for every
    // candidate.
    let jd_summary = summarize_jd(services.generator.as_ref(), jd_text).await?;
    let jd_embedding = services.embedder.embed(&jd_summary).await?;
    info!(dimensions = jd_embedding.len(), "job description baseline ready");

    let mut report = RunReport {
        run_id,
        job_role: options.job_role.clone(),
        mode: options.mode,
        considered: 0,
        excluded_unreadable: 0,
        excluded_insufficient_text: 0,
        excluded_incomplete_profile: 0,
        service_failures: 0,
        rejected: 0,
        notification_failures: 0,
        shortlisted: Vec::new(),
    };

    for path in &resume_files {
        report.considered += 1;
        match evaluate_resume(services, options, &jd_embedding, path).await {
            CandidateOutcome::Unreadable => report.excluded_unreadable += 1,
            CandidateOutcome::InsufficientText => report.excluded_insufficient_text += 1,
            CandidateOutcome::IncompleteProfile => report.excluded_incomplete_profile += 1,
            CandidateOutcome::ServiceFailed => report.service_failures += 1,
            CandidateOutcome::Rejected { name, score } => {
                info!(%name, score, threshold = options.mode.threshold(), "rejected");
                report.rejected += 1;
            }
            CandidateOutcome::NotificationFailed { name, score } => {
                warn!(%name, score, "shortlisted by score but invitation failed; not recorded");
                report.notification_failures += 1;
            }
            CandidateOutcome::Shortlisted(entry) => {
                info!(name = %entry.name, score = entry.score, "shortlisted");
                report.shortlisted.push(entry);
            }
        }
    }

    info!(
        %run_id,
        considered = report.considered,
        shortlisted = report.shortlisted.len(),
        notification_failures = report.notification_failures,
        "screening run finished"
    );
    Ok(report)
}

async fn evaluate_resume(
    services: &Services,
    options: &RunOptions,
    jd_embedding: &[f32],
    path: &Path,
) -> CandidateOutcome {
    let resume_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let raw_text = match extract_document_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(file = %resume_file, error = %e, "resume excluded: extraction failed");
            return CandidateOutcome::Unreadable;
        }
    };

    let normalized = normalize(&raw_text);
    if normalized.is_empty() {
        warn!(file = %resume_file, "resume excluded: no usable text after normalization");
        return CandidateOutcome::InsufficientText;
    }

    let profile = match extract_profile(services.generator.as_ref(), &normalized).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(file = %resume_file, error = %e, "generative service failed for resume");
            return CandidateOutcome::ServiceFailed;
        }
    };

    // Sentinel email or summary: non-actionable, excluded before scoring.
    let Some(email) = profile.email.clone().filter(|_| profile.is_actionable()) else {
        warn!(file = %resume_file, "resume excluded: profile incomplete");
        return CandidateOutcome::IncompleteProfile;
    };

    let cv_embedding = match services.embedder.embed(&profile.summary).await {
        Ok(embedding) => embedding,
        Err(e) => {
            error!(file = %resume_file, error = %e, "embedding service failed for resume");
            return CandidateOutcome::ServiceFailed;
        }
    };

    let score = cosine_similarity(jd_embedding, &cv_embedding);
    if !is_shortlisted(score, options.mode) {
        return CandidateOutcome::Rejected {
            name: profile.name,
            score,
        };
    }

    let invitation = Invitation {
        name: profile.name.clone(),
        email: email.clone(),
        job_role: options.job_role.clone(),
        sender: options.sender.clone(),
    };

    if let Err(e) = services
        .notifier
        .send_invitation(&invitation, &options.secret)
        .await
    {
        warn!(file = %resume_file, error = %e, "invitation delivery failed");
        return CandidateOutcome::NotificationFailed {
            name: profile.name,
            score,
        };
    }

    let entry = ShortlistEntry {
        name: profile.name,
        email,
        score,
        resume_file,
    };

    // Recorder failure after a delivered invitation is logged but does not
    // un-shortlist the candidate: the notification already went out.
    if let Err(e) = services.recorder.record(&entry).await {
        error!(name = %entry.name, error = %e, "failed to record shortlisted candidate");
    }

    CandidateOutcome::Shortlisted(entry)
}

/// Collects the resume corpus, filtered by the configured extensions and
/// sorted by file name so runs over an unchanged corpus are deterministic.
fn list_resume_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, ScreenError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        ScreenError::Configuration(format!("cannot read resume directory {}: {e}", dir.display()))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| extensions.contains(&e.to_lowercase()))
                    .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        return Err(ScreenError::Configuration(format!(
            "no resume documents with extensions {:?} in {}",
            extensions,
            dir.display()
        )));
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;
    use crate::notify::NotifyError;

    const JD_TEXT: &str =
        "We are hiring a backend engineer with Python and distributed systems experience.";
    const JD_SUMMARY: &str =
        "Seeking a backend engineer with Python and distributed systems experience";

    /// Unit vector at cosine `s` from the JD axis [1, 0].
    fn unit_at(s: f32) -> Vec<f32> {
        vec![s, (1.0 - s * s).sqrt()]
    }

    /// Deterministic generator double: a fixed JD summary plus per-candidate
    /// profile replies keyed by a marker substring of the resume text.
    struct StubGenerator {
        replies: HashMap<&'static str, String>,
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("Condense the following job description") {
                return Ok(JD_SUMMARY.to_string());
            }
            for (marker, reply) in &self.replies {
                if prompt.contains(marker) {
                    return Ok(reply.clone());
                }
            }
            Err(LlmError::EmptyContent)
        }
    }

    /// Embedder double mapping known summaries to vectors at fixed cosine
    /// similarities, counting every call it receives.
    struct StubEmbedder {
        seen: Mutex<Vec<String>>,
    }

    impl StubEmbedder {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
            self.seen.lock().unwrap().push(text.to_string());
            if text.contains(JD_SUMMARY) {
                Ok(vec![1.0, 0.0])
            } else if text.contains("ALICE PROFILE") {
                Ok(unit_at(0.82))
            } else if text.contains("BOB PROFILE") {
                Ok(unit_at(0.35))
            } else if text.contains("CAROL PROFILE") {
                Ok(unit_at(0.55))
            } else {
                Err(LlmError::EmptyContent)
            }
        }
    }

    struct StubNotifier {
        succeed: bool,
        sent_to: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for StubNotifier {
        async fn send_invitation(
            &self,
            invitation: &Invitation,
            _secret: &Secret,
        ) -> Result<(), NotifyError> {
            if self.succeed {
                self.sent_to.lock().unwrap().push(invitation.email.clone());
                Ok(())
            } else {
                Err(NotifyError::Relay {
                    status: 550,
                    message: "rejected".to_string(),
                })
            }
        }
    }

    #[derive(Default)]
    struct StubRecorder {
        recorded: Mutex<Vec<ShortlistEntry>>,
    }

    #[async_trait]
    impl Recorder for StubRecorder {
        async fn record(&self, entry: &ShortlistEntry) -> anyhow::Result<()> {
            self.recorded.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn profile_reply(marker: &str, name: &str, email: Option<&str>) -> String {
        let mut reply = format!("Summary: {marker} qualifications paragraph.\nName: {name}\n");
        if let Some(email) = email {
            reply.push_str(&format!("Email: {email}\n"));
        }
        reply
    }

    fn standard_replies() -> HashMap<&'static str, String> {
        HashMap::from([
            (
                "ALICE RESUME",
                profile_reply("ALICE PROFILE", "Alice Archer", Some("alice@example.com")),
            ),
            (
                "BOB RESUME",
                profile_reply("BOB PROFILE", "Bob Birch", Some("bob@example.com")),
            ),
            (
                "CAROL RESUME",
                profile_reply("CAROL PROFILE", "Carol Cole", Some("carol@example.com")),
            ),
        ])
    }

    fn write_resume(dir: &Path, file: &str, marker: &str) {
        let mut f = std::fs::File::create(dir.join(file)).unwrap();
        writeln!(f, "{marker} experience with Python and distributed systems.").unwrap();
    }

    fn corpus_dir(markers: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (file, marker) in markers {
            write_resume(dir.path(), file, marker);
        }
        dir
    }

    fn options(mode: ScreeningMode) -> RunOptions {
        RunOptions {
            job_role: "Backend Engineer".to_string(),
            sender: "recruiting@corp.io".to_string(),
            secret: Secret::new("relay-token"),
            mode,
            extensions: vec!["txt".to_string()],
        }
    }

    struct Harness {
        services: Services,
        embedder_calls: Arc<StubEmbedder>,
        notifier: Arc<StubNotifier>,
        recorder: Arc<StubRecorder>,
    }

    fn harness(replies: HashMap<&'static str, String>, notify_succeeds: bool) -> Harness {
        let embedder = Arc::new(StubEmbedder::new());
        let notifier = Arc::new(StubNotifier {
            succeed: notify_succeeds,
            sent_to: Mutex::new(Vec::new()),
        });
        let recorder = Arc::new(StubRecorder::default());
        Harness {
            services: Services {
                generator: Arc::new(StubGenerator { replies }),
                embedder: embedder.clone(),
                notifier: notifier.clone(),
                recorder: recorder.clone(),
            },
            embedder_calls: embedder,
            notifier,
            recorder,
        }
    }

    #[tokio::test]
    async fn test_strict_mode_shortlists_only_the_strong_match() {
        let dir = corpus_dir(&[
            ("alice.txt", "ALICE RESUME"),
            ("bob.txt", "BOB RESUME"),
            ("carol.txt", "CAROL RESUME"),
        ]);
        let h = harness(standard_replies(), true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.considered, 3);
        assert_eq!(report.shortlisted.len(), 1);
        assert_eq!(report.shortlisted[0].name, "Alice Archer");
        assert_eq!(report.shortlisted[0].resume_file, "alice.txt");
        // 0.55 and 0.35 both fall below the 0.70 strict threshold.
        assert_eq!(report.rejected, 2);
    }

    #[tokio::test]
    async fn test_relaxed_mode_admits_the_moderate_match_but_not_the_weak_one() {
        let dir = corpus_dir(&[
            ("alice.txt", "ALICE RESUME"),
            ("bob.txt", "BOB RESUME"),
            ("carol.txt", "CAROL RESUME"),
        ]);
        let h = harness(standard_replies(), true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Relaxed), JD_TEXT, dir.path())
            .await
            .unwrap();

        let mut names: Vec<&str> = report.shortlisted.iter().map(|e| e.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Alice Archer", "Carol Cole"]);
        // 0.35 < 0.40: still rejected under relaxed.
        assert_eq!(report.rejected, 1);
    }

    #[tokio::test]
    async fn test_sentinel_email_never_reaches_the_embedder() {
        let mut replies = standard_replies();
        replies.insert("DAVE RESUME", profile_reply("DAVE PROFILE", "Dave Dunn", None));
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME"), ("dave.txt", "DAVE RESUME")]);
        let h = harness(replies, true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.excluded_incomplete_profile, 1);
        assert_eq!(report.shortlisted.len(), 1);
        let embedded = h.embedder_calls.seen.lock().unwrap().clone();
        assert!(
            embedded.iter().all(|t| !t.contains("DAVE")),
            "sentinel-email profile was embedded: {embedded:?}"
        );
    }

    #[tokio::test]
    async fn test_notification_failure_excludes_from_shortlist_and_recorder() {
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        let h = harness(standard_replies(), false);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.notification_failures, 1);
        assert!(report.shortlisted.is_empty());
        assert!(h.recorder.recorded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shortlisted_candidate_is_notified_and_recorded() {
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        let h = harness(standard_replies(), true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.shortlisted.len(), 1);
        assert_eq!(
            h.notifier.sent_to.lock().unwrap().as_slice(),
            ["alice@example.com"]
        );
        let recorded = h.recorder.recorded.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], report.shortlisted[0]);
    }

    #[tokio::test]
    async fn test_reruns_over_unchanged_corpus_produce_identical_shortlists() {
        let dir = corpus_dir(&[
            ("alice.txt", "ALICE RESUME"),
            ("bob.txt", "BOB RESUME"),
            ("carol.txt", "CAROL RESUME"),
        ]);
        let h = harness(standard_replies(), true);
        let opts = options(ScreeningMode::Relaxed);

        let first = screen_directory(&h.services, &opts, JD_TEXT, dir.path())
            .await
            .unwrap();
        let second = screen_directory(&h.services, &opts, JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(first.shortlisted, second.shortlisted);
    }

    #[tokio::test]
    async fn test_malformed_reply_excludes_resume_without_failing_run() {
        let mut replies = HashMap::new();
        replies.insert("ALICE RESUME", "no labels whatsoever in this reply".to_string());
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        let h = harness(replies, true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.excluded_incomplete_profile, 1);
        assert!(report.shortlisted.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_resume_is_counted_and_skipped() {
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        // Empty file: extraction finds no text layer.
        std::fs::File::create(dir.path().join("blank.txt")).unwrap();
        let h = harness(standard_replies(), true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        assert_eq!(report.considered, 2);
        assert_eq!(report.excluded_unreadable, 1);
        assert_eq!(report.shortlisted.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_job_description_aborts_before_any_resume() {
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        let h = harness(standard_replies(), true);

        let err = screen_directory(&h.services, &options(ScreeningMode::Strict), "  ", dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ScreenError::Configuration(_)));
        assert!(h.embedder_calls.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_corpus_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(standard_replies(), true);

        let err = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, ScreenError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_extension_filter_is_configuration() {
        let dir = corpus_dir(&[("alice.txt", "ALICE RESUME")]);
        std::fs::write(dir.path().join("notes.md"), "not a resume").unwrap();
        let h = harness(standard_replies(), true);

        let report = screen_directory(&h.services, &options(ScreeningMode::Strict), JD_TEXT, dir.path())
            .await
            .unwrap();

        // Only the configured .txt extension is considered.
        assert_eq!(report.considered, 1);
    }
}
