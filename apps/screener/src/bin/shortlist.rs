//! Console driver for the screening pipeline: job description and resume
//! corpus from the filesystem, results on stdout.
//!
//! Shares the pipeline core with `screener-api`; only configuration
//! sourcing and result presentation differ.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use screener::config::{parse_extensions, Config, Secret};
use screener::db::{create_pool, init_schema};
use screener::llm_client::LlmClient;
use screener::notify::HttpNotifier;
use screener::recorder::SqliteRecorder;
use screener::screening::pipeline::{screen_directory, RunOptions, RunReport, Services};
use screener::screening::scoring::ScreeningMode;

/// Screen a directory of resumes against a job description.
#[derive(Parser)]
#[command(
    name = "shortlist",
    version,
    about = "Score resumes against a job description and notify qualifying candidates."
)]
struct Cli {
    /// Job role the candidates are screened for.
    #[arg(long)]
    role: String,

    /// Path to the job description text file.
    #[arg(long, default_value = "job_description.txt")]
    jd: PathBuf,

    /// Directory containing the resume corpus.
    #[arg(long, default_value = "CVs")]
    cv_dir: PathBuf,

    /// Strictness mode: strict (threshold 0.70) or relaxed (0.40).
    #[arg(long, default_value = "strict")]
    mode: ScreeningMode,

    /// Sender identity passed to the notifier.
    #[arg(long)]
    sender: String,

    /// Resume file extensions to consider (comma-separated); defaults to
    /// the RESUME_EXTENSIONS environment setting.
    #[arg(long)]
    extensions: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .init();

    // The sender secret never appears on the command line.
    let secret = std::env::var("SENDER_SECRET")
        .map(Secret::new)
        .context("Required environment variable 'SENDER_SECRET' is not set")?;

    let jd_text = std::fs::read_to_string(&cli.jd)
        .with_context(|| format!("cannot read job description {}", cli.jd.display()))?;

    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    let llm = Arc::new(LlmClient::new(
        config.llm_base_url.clone(),
        config.generation_model.clone(),
        config.embedding_model.clone(),
    ));
    let services = Services {
        generator: llm.clone(),
        embedder: llm,
        notifier: Arc::new(HttpNotifier::new(config.notifier_url.clone())),
        recorder: Arc::new(SqliteRecorder::new(db)),
    };

    let options = RunOptions {
        job_role: cli.role,
        sender: cli.sender,
        secret,
        mode: cli.mode,
        extensions: cli
            .extensions
            .as_deref()
            .map(parse_extensions)
            .unwrap_or_else(|| config.resume_extensions.clone()),
    };

    let report = screen_directory(&services, &options, &jd_text, &cli.cv_dir).await?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\nScreening run {} ({} mode)", report.run_id, report.mode);
    println!(
        "Considered {} resumes: {} unreadable, {} without usable text, {} incomplete profiles, \
         {} service failures, {} rejected, {} notification failures.",
        report.considered,
        report.excluded_unreadable,
        report.excluded_insufficient_text,
        report.excluded_incomplete_profile,
        report.service_failures,
        report.rejected,
        report.notification_failures,
    );

    println!("\nFinal shortlisted candidates:");
    if report.shortlisted.is_empty() {
        println!("  (none)");
        return;
    }
    for (i, candidate) in report.shortlisted.iter().enumerate() {
        println!(
            "  {}. {} | {} | score {:.2} | {}",
            i + 1,
            candidate.name,
            candidate.email,
            candidate.score,
            candidate.resume_file,
        );
    }
}
