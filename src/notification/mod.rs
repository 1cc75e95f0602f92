//! # Notification
//!
//! One email per job. A successful report goes to the success recipients with
//! its ZIP attached; a failed report goes to the error recipients with the
//! failure note inline.
//!
//! Delivery problems, including an OAuth2 token refresh failure, are returned
//! to the caller as a `NotificationError`. They are reported on their own and
//! never change the report outcome being notified about.

pub mod gmail;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::constants::stages;
use crate::error::NotificationError;
use crate::logging::{log_error, log_job_operation};
use crate::models::JobOutcome;
use crate::secrets::CredentialBundle;

pub use gmail::GmailMailer;

/// A fully addressed message ready for a [`Mailer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment: Option<PathBuf>,
}

/// Mail transport seam
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        email: &OutgoingEmail,
        credentials: &CredentialBundle,
    ) -> Result<(), NotificationError>;
}

/// Builds and sends the email for a job outcome
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Send the success or failure email for `outcome`
    pub async fn notify(
        &self,
        outcome: &JobOutcome,
        credentials: &CredentialBundle,
    ) -> Result<(), NotificationError> {
        let email = compose(outcome, credentials);
        if let Some(path) = &email.attachment {
            log_job_operation(
                stages::MAIL,
                &outcome.job_id,
                "attaching",
                Some(&format!("Attached file {}", path.display())),
            );
        }

        match self.mailer.send(&email, credentials).await {
            Ok(()) => {
                log_job_operation(
                    stages::MAIL_SENT,
                    &outcome.job_id,
                    "sent",
                    Some(&format!("Mail sent to {:?}", email.to)),
                );
                Ok(())
            }
            Err(e) => {
                log_error(
                    &outcome.job_id,
                    stages::MAIL_ERROR,
                    &e.to_string(),
                    Some(&email.subject),
                );
                Err(e)
            }
        }
    }
}

/// Address and word the email for an outcome
pub fn compose(outcome: &JobOutcome, credentials: &CredentialBundle) -> OutgoingEmail {
    let identifier = &outcome.identifier;

    if outcome.is_success() {
        OutgoingEmail {
            from: credentials.sender_email.clone(),
            to: credentials.success_recipients.clone(),
            subject: format!("Report: {identifier}"),
            body: format!(
                "Hi All,\n\n\
                 The report for {identifier} is ready.\n\
                 Attached ZIP file contains the CSV output.\n\n\
                 Regards,\nAutomation System\n\n\
                 **This is an automated email.**"
            ),
            attachment: outcome.artifact.as_ref().map(|a| a.zip_path.clone()),
        }
    } else {
        OutgoingEmail {
            from: credentials.sender_email.clone(),
            to: credentials.error_recipients.clone(),
            subject: format!("FAILED: {identifier}"),
            body: format!("Error executing job {identifier}\n\n{}", outcome.note),
            attachment: None,
        }
    }
}
