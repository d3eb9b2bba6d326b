//! POST /api/v1/screenings — multipart screening driver.
//!
//! Collects the run configuration, the JD file, and the resume uploads from
//! one form, stages the resumes in a request-scoped temp directory, and
//! hands everything to the shared pipeline core.

use std::path::Path;

use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use tracing::debug;

use crate::config::Secret;
use crate::errors::AppError;
use crate::screening::pipeline::{screen_directory, RunOptions, RunReport};
use crate::screening::scoring::ScreeningMode;
use crate::state::AppState;

struct ScreeningForm {
    job_title: Option<String>,
    sender: Option<String>,
    secret: Option<Secret>,
    mode: Option<ScreeningMode>,
    jd_text: Option<String>,
    resumes: Vec<(String, Bytes)>,
}

pub async fn handle_screening(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RunReport>, AppError> {
    let form = read_form(multipart).await?;

    let job_title = require_field(form.job_title, "job_title")?;
    let sender = require_field(form.sender, "sender")?;
    let secret = form
        .secret
        .ok_or_else(|| AppError::Validation("missing form field 'sender_secret'".to_string()))?;
    let mode = form
        .mode
        .ok_or_else(|| AppError::Validation("missing form field 'mode'".to_string()))?;
    let jd_text = require_field(form.jd_text, "jd_file")?;

    // Stage the uploads on disk for the duration of this request only.
    let staging = tempfile::tempdir().map_err(anyhow::Error::from)?;
    for (file_name, data) in &form.resumes {
        // Keep only the final path component of whatever the client sent.
        let file_name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| AppError::Validation(format!("invalid resume file name '{file_name}'")))?;
        std::fs::write(staging.path().join(file_name), data).map_err(anyhow::Error::from)?;
    }

    let options = RunOptions {
        job_role: job_title,
        sender,
        secret,
        mode,
        extensions: state.config.resume_extensions.clone(),
    };

    let report = screen_directory(&state.services, &options, &jd_text, staging.path()).await?;
    Ok(Json(report))
}

async fn read_form(mut multipart: Multipart) -> Result<ScreeningForm, AppError> {
    let mut form = ScreeningForm {
        job_title: None,
        sender: None,
        secret: None,
        mode: None,
        jd_text: None,
        resumes: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart request: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "job_title" => form.job_title = Some(field_text(field).await?),
            "sender" => form.sender = Some(field_text(field).await?),
            "sender_secret" => form.secret = Some(Secret::new(field_text(field).await?)),
            "mode" => {
                let raw = field_text(field).await?;
                form.mode = Some(raw.parse::<ScreeningMode>().map_err(AppError::Validation)?);
            }
            "jd_file" => form.jd_text = Some(field_text(field).await?),
            "cv_files" => {
                let file_name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or_else(|| {
                        AppError::Validation("resume upload is missing a file name".to_string())
                    })?;
                let data = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("failed to read resume upload: {e}"))
                })?;
                form.resumes.push((file_name, data));
            }
            other => debug!(field = %other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("failed to read form field: {e}")))
}

fn require_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("missing form field '{name}'")))
}
