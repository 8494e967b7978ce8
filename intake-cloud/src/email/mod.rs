//! Transactional email via the Brevo REST API (no SDK dependency)
//!
//! [`Notifier`] owns the request contract (field presence, address shape,
//! credential check); [`EmailProvider`] is the one outbound call.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};

use crate::config::Config;

/// One outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status
    #[error("provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("provider unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ProviderError>;
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with characters on both sides.
pub fn is_valid_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

// ── Brevo ──

#[derive(Serialize)]
struct BrevoAddress<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoRequest<'a> {
    sender: BrevoAddress<'a>,
    to: Vec<BrevoAddress<'a>>,
    subject: &'a str,
    html_content: String,
}

pub struct BrevoProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoProvider {
    pub fn new(api_url: String, api_key: String, sender_email: String, sender_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            sender_email,
            sender_name,
        }
    }
}

#[async_trait]
impl EmailProvider for BrevoProvider {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), ProviderError> {
        let body = BrevoRequest {
            sender: BrevoAddress {
                name: Some(&self.sender_name),
                email: &self.sender_email,
            },
            to: vec![BrevoAddress {
                name: None,
                email: &email.to,
            }],
            subject: &email.subject,
            html_content: format!("<p>{}</p>", escape_html(&email.message)),
        };

        let resp = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ProviderError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

// ── Notifier ──

#[derive(Clone)]
pub struct Notifier {
    provider: Option<Arc<dyn EmailProvider>>,
}

impl Notifier {
    /// `None` leaves the notifier unconfigured: every send fails with
    /// [`ErrorCode::EmailNotConfigured`].
    pub fn new(provider: Option<Arc<dyn EmailProvider>>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config) -> Self {
        let provider = config.email_api_key.as_ref().map(|key| {
            Arc::new(BrevoProvider::new(
                config.email_api_url.clone(),
                key.clone(),
                config.sender_email.clone(),
                config.sender_name.clone(),
            )) as Arc<dyn EmailProvider>
        });
        if provider.is_none() {
            tracing::warn!("BREVO_API_KEY not set, outgoing email disabled");
        }
        Self::new(provider)
    }

    /// Send one message. Input is checked before the credential, so a
    /// malformed request is a 400 even on an unconfigured server.
    pub async fn send_email(&self, to: &str, subject: &str, message: &str) -> Result<(), AppError> {
        if to.is_empty() || subject.is_empty() || message.is_empty() {
            return Err(AppError::validation("Missing fields"));
        }
        if !is_valid_email(to) {
            return Err(AppError::new(ErrorCode::EmailInvalid));
        }
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AppError::new(ErrorCode::EmailNotConfigured))?;

        let email = OutgoingEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        };

        match provider.send(&email).await {
            Ok(()) => {
                tracing::info!(to = to, subject = subject, "Email sent");
                Ok(())
            }
            Err(ProviderError::Rejected { status, body }) => {
                tracing::warn!(to = to, status, body = %body, "Email provider rejected request");
                Err(AppError::new(ErrorCode::EmailProviderRejected)
                    .with_detail("provider_status", status)
                    .with_detail("provider_body", body))
            }
            Err(ProviderError::Transport(e)) => {
                tracing::error!(to = to, error = %e, "Email provider unreachable");
                Err(AppError::internal("Failed to send email"))
            }
        }
    }
}
