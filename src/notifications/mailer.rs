// src/notifications/mailer.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::sync::{Arc, Mutex};

use super::EmailMessage;
use crate::app_log;
use crate::core::config_manager::MailSettings;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[rocket::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message, returning the provider's message id.
    async fn send(&self, message: &EmailMessage) -> Result<String>;
}

/// Delivers through the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Debug, Deserialize)]
struct ResendResponse {
    id: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            from,
        })
    }
}

#[rocket::async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        let payload = serde_json::json!({
            "from": self.from,
            "to": message.to,
            "subject": message.subject,
            "html": message.html,
        });

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("HTTP request to Resend failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Resend rejected email ({}): {}", status, body);
        }

        let parsed: ResendResponse = response
            .json()
            .await
            .context("Failed to parse Resend response")?;

        app_log!(info, "Email '{}' sent to {} ({})", message.subject, message.to, parsed.id);
        Ok(parsed.id)
    }
}

/// Logs messages instead of sending them. Used when no API key is configured.
pub struct LogMailer;

#[rocket::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        app_log!(
            info,
            "Email delivery disabled, would send '{}' to {}",
            message.subject,
            message.to
        );
        Ok("logged".to_string())
    }
}

/// Keeps messages in memory; used by tests.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail_for: Option<String>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that errors for one recipient and accepts everyone else.
    pub fn failing_for(recipient: &str) -> Self {
        Self {
            sent: Arc::default(),
            fail_for: Some(recipient.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[rocket::async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String> {
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            anyhow::bail!("delivery to {} refused", message.to);
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| anyhow::anyhow!("mailer lock poisoned"))?;
        sent.push(message.clone());
        Ok(format!("mem-{}", sent.len()))
    }
}

/// Resend when an API key is configured, otherwise log-only.
pub fn mailer_from_settings(settings: &MailSettings) -> Result<Arc<dyn Mailer>> {
    match &settings.resend_api_key {
        Some(key) => {
            app_log!(info, "Email delivery via Resend as {}", settings.from_address);
            Ok(Arc::new(ResendMailer::new(key.clone(), settings.from_address.clone())?))
        }
        None => {
            app_log!(warn, "RESEND_API_KEY not set, emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
