//! Gmail API delivery with OAuth2 refresh-token authentication.
//!
//! Each send first exchanges the refresh token for a short-lived access token,
//! then posts the RFC 5322 message (built with `lettre`, base64url encoded) to
//! the Gmail `messages/send` endpoint.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use super::{Mailer, OutgoingEmail};
use crate::config::RunnerConfig;
use crate::error::NotificationError;
use crate::secrets::CredentialBundle;

const SEND_PATH: &str = "/gmail/v1/users/me/messages/send";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
pub struct GmailMailer {
    http: reqwest::Client,
    token_uri: String,
    api_base: String,
}

impl GmailMailer {
    pub fn new(token_uri: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_uri: token_uri.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(&config.oauth_token_uri, &config.gmail_api_base)
    }

    /// Exchange the refresh token for an access token
    pub async fn refresh_access_token(
        &self,
        credentials: &CredentialBundle,
    ) -> Result<String, NotificationError> {
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("refresh_token", credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| NotificationError::TokenRefresh(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::TokenRefresh(format!("{status}: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::TokenRefresh(e.to_string()))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Mailer for GmailMailer {
    async fn send(
        &self,
        email: &OutgoingEmail,
        credentials: &CredentialBundle,
    ) -> Result<(), NotificationError> {
        let access_token = self.refresh_access_token(credentials).await?;

        let attachment = match &email.attachment {
            Some(path) => Some(read_attachment(path).await?),
            None => None,
        };
        let raw = encode_message(email, attachment)?;

        let response = self
            .http
            .post(format!("{}{SEND_PATH}", self.api_base))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| NotificationError::Send(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Send(format!("{status}: {body}")));
        }

        debug!(subject = %email.subject, recipients = email.to.len(), "Gmail accepted message");
        Ok(())
    }
}

async fn read_attachment(path: &Path) -> Result<(String, Vec<u8>), NotificationError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| NotificationError::Attachment(format!("no file name in {}", path.display())))?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| NotificationError::Attachment(format!("{}: {e}", path.display())))?;
    Ok((name, bytes))
}

/// Build the MIME message and encode it for the Gmail `raw` field
pub fn encode_message(
    email: &OutgoingEmail,
    attachment: Option<(String, Vec<u8>)>,
) -> Result<String, NotificationError> {
    let mut builder = Message::builder()
        .from(email.from.parse::<Mailbox>()?)
        .subject(email.subject.as_str());
    for recipient in &email.to {
        builder = builder.to(recipient.parse::<Mailbox>()?);
    }

    let text = SinglePart::plain(email.body.clone());
    let message = match attachment {
        Some((name, bytes)) => {
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|e| NotificationError::Build(e.to_string()))?;
            builder.multipart(
                MultiPart::mixed()
                    .singlepart(text)
                    .singlepart(Attachment::new(name).body(bytes, content_type)),
            )?
        }
        None => builder.singlepart(text)?,
    };

    Ok(URL_SAFE.encode(message.formatted()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn credentials() -> CredentialBundle {
        CredentialBundle {
            database_url: "sqlite::memory:".to_string(),
            sender_email: "reports@example.com".to_string(),
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            refresh_token: "refresh-token".to_string(),
            success_recipients: vec!["team@example.com".to_string()],
            error_recipients: vec!["oncall@example.com".to_string()],
        }
    }

    fn email(attachment: Option<std::path::PathBuf>) -> OutgoingEmail {
        OutgoingEmail {
            from: "reports@example.com".to_string(),
            to: vec!["team@example.com".to_string(), "lead@example.com".to_string()],
            subject: "Report: a".to_string(),
            body: "The report for a is ready.".to_string(),
            attachment,
        }
    }

    fn decode(raw: &str) -> String {
        String::from_utf8(URL_SAFE.decode(raw).unwrap()).unwrap()
    }

    #[test]
    fn plain_message_has_headers_and_body() {
        let raw = encode_message(&email(None), None).unwrap();
        let text = decode(&raw);

        assert!(text.contains("From: reports@example.com"));
        assert!(text.contains("team@example.com"));
        assert!(text.contains("lead@example.com"));
        assert!(text.contains("Subject: Report: a"));
        assert!(text.contains("The report for a is ready."));
    }

    #[test]
    fn attachment_is_named_in_the_message() {
        let raw = encode_message(
            &email(None),
            Some(("a_2026-10-16.zip".to_string(), vec![0x50, 0x4b, 0x03, 0x04])),
        )
        .unwrap();
        let text = decode(&raw);

        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("a_2026-10-16.zip"));
        assert!(text.contains("application/octet-stream"));
    }

    #[test]
    fn bad_address_is_rejected() {
        let mut bad = email(None);
        bad.to = vec!["not-an-address".to_string()];

        assert!(matches!(
            encode_message(&bad, None),
            Err(NotificationError::Address(_))
        ));
    }

    #[tokio::test]
    async fn refreshes_token_then_sends() {
        let server = MockServer::start_async().await;
        let token_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/token")
                    .body_contains("grant_type=refresh_token")
                    .body_contains("refresh_token=refresh-token");
                then.status(200)
                    .json_body(json!({ "access_token": "short-lived", "expires_in": 3599 }));
            })
            .await;
        let send_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(SEND_PATH)
                    .header("authorization", "Bearer short-lived");
                then.status(200).json_body(json!({ "id": "msg-1" }));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("a_2026-10-16.zip");
        std::fs::write(&zip_path, b"PK\x03\x04").unwrap();

        let mailer = GmailMailer::new(server.url("/token"), server.base_url());
        mailer.send(&email(Some(zip_path)), &credentials()).await.unwrap();

        token_mock.assert_async().await;
        send_mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_refresh_failure_skips_send() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(400).json_body(json!({ "error": "invalid_grant" }));
            })
            .await;
        let send_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(SEND_PATH);
                then.status(200);
            })
            .await;

        let mailer = GmailMailer::new(server.url("/token"), server.base_url());
        let err = mailer.send(&email(None), &credentials()).await.unwrap_err();

        assert!(matches!(err, NotificationError::TokenRefresh(ref m) if m.contains("invalid_grant")));
        send_mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn rejected_send_is_a_send_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({ "access_token": "t" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(SEND_PATH);
                then.status(403).body("insufficient scope");
            })
            .await;

        let mailer = GmailMailer::new(server.url("/token"), server.base_url());
        let err = mailer.send(&email(None), &credentials()).await.unwrap_err();

        assert!(matches!(err, NotificationError::Send(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn missing_attachment_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/token");
                then.status(200).json_body(json!({ "access_token": "t" }));
            })
            .await;

        let mailer = GmailMailer::new(server.url("/token"), server.base_url());
        let err = mailer
            .send(&email(Some("/definitely/not/here.zip".into())), &credentials())
            .await
            .unwrap_err();

        assert!(matches!(err, NotificationError::Attachment(_)));
    }
}
