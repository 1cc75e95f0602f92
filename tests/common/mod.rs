//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod workspace;

pub use workspace::*;

use async_trait::async_trait;
use parking_lot::Mutex;
use report_runner::{CredentialBundle, Mailer, NotificationError, OutgoingEmail};

/// Query returning three rows without touching any table
pub const THREE_ROW_QUERY: &str = "SELECT 1 AS id, 'alpha' AS name \
     UNION ALL SELECT 2, 'beta' \
     UNION ALL SELECT 3, 'gamma';";

/// Mailer that keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<&'static str>,
}

impl RecordingMailer {
    pub fn failing(message: &'static str) -> Self {
        Self {
            fail_with: Some(message),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        email: &OutgoingEmail,
        _credentials: &CredentialBundle,
    ) -> Result<(), NotificationError> {
        if let Some(message) = self.fail_with {
            return Err(NotificationError::TokenRefresh(message.to_string()));
        }
        self.sent.lock().push(email.clone());
        Ok(())
    }
}

/// Read the audit log including its header row
pub fn read_audit_log(path: &std::path::Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("audit log should exist")
        .records()
        .map(|r| {
            r.expect("audit log row should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
