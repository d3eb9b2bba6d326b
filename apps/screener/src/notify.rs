//! Notifier — external collaborator seam for sending interview invitations.
//!
//! The pipeline only sees the trait; the production implementation is a
//! thin HTTP client for an external mail relay. Email transport itself
//! (SMTP, provider APIs) lives behind the relay.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::Secret;

/// Failure to deliver an invitation. The candidate stays unrecorded and is
/// surfaced in the run report as a notification failure, not a run error.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay rejected send (status {status}): {message}")]
    Relay { status: u16, message: String },
}

/// Everything the collaborator needs to compose and address an invitation.
/// The sender secret travels separately as an opaque token.
#[derive(Debug, Clone)]
pub struct Invitation {
    pub name: String,
    pub email: String,
    pub job_role: String,
    pub sender: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// At most one attempt per shortlisted candidate per run.
    async fn send_invitation(&self, invitation: &Invitation, secret: &Secret)
        -> Result<(), NotifyError>;
}

/// Subject line for an invitation.
pub fn invitation_subject(invitation: &Invitation) -> String {
    format!("Interview Invitation for {}", invitation.name)
}

/// Plain-text invitation body.
pub fn invitation_body(invitation: &Invitation) -> String {
    format!(
        "Dear {name},\n\n\
We are pleased to inform you that you have been shortlisted for the position of {role} \
at our organization. After reviewing your resume, we were impressed by your background, \
skill set, and the projects you've undertaken.\n\n\
We believe that your experience and passion align well with our team's goals, and we \
would love to learn more about your potential contributions.\n\n\
Should you have any questions in the meantime, feel free to contact us.\n\n\
Looking forward to speaking with you soon.\n\n\
Best regards,\nRecruitment Team",
        name = invitation.name,
        role = invitation.job_role,
    )
}

#[derive(Debug, Serialize)]
struct RelaySendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    body: String,
}

/// Mail-relay client. POSTs composed invitations to `{relay}/send` with the
/// sender secret as a bearer token.
#[derive(Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpNotifier {
    pub fn new(relay_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            relay_url: relay_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send_invitation(
        &self,
        invitation: &Invitation,
        secret: &Secret,
    ) -> Result<(), NotifyError> {
        let request = RelaySendRequest {
            from: &invitation.sender,
            to: &invitation.email,
            subject: invitation_subject(invitation),
            body: invitation_body(invitation),
        };

        let response = self
            .client
            .post(format!("{}/send", self.relay_url))
            .bearer_auth(secret.reveal())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        info!(to = %invitation.email, "invitation sent");
        Ok(())
    }
}
