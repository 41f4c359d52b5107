//! WhatsApp alert notifier backed by the Twilio messaging API

use crate::config::{NotifierConfig, TwilioCredentials};
use crate::error::NotificationError;
use crate::types::alert::alert_message;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Outbound alert channel.
///
/// Implementations report every failure as [`NotificationError`]; callers
/// downgrade it to a warning and never retry.
pub trait AlertNotifier {
    /// Send a fraud alert for the given probability, returning the provider's
    /// message id.
    fn send(&self, probability: f64) -> impl Future<Output = Result<String, NotificationError>> + Send;
}

/// Created message as returned by Twilio
#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

/// Twilio error body
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Notifier sending WhatsApp messages through Twilio
#[derive(Clone)]
pub struct TwilioNotifier {
    client: reqwest::Client,
    api_base: String,
    credentials: TwilioCredentials,
}

impl TwilioNotifier {
    /// Create a new notifier
    pub fn new(config: &NotifierConfig, credentials: TwilioCredentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!("{}/2010-04-01/Accounts/{}/Messages.json", self.api_base, account_sid)
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, NotificationError> {
    value
        .as_deref()
        .ok_or(NotificationError::MissingCredentials(name))
}

impl AlertNotifier for TwilioNotifier {
    async fn send(&self, probability: f64) -> Result<String, NotificationError> {
        let account_sid = required(&self.credentials.account_sid, "TWILIO_SID")?;
        let auth_token = required(&self.credentials.auth_token, "TWILIO_AUTH")?;
        let from = required(&self.credentials.from, "TWILIO_WHATSAPP_FROM")?;
        let to = required(&self.credentials.to, "TWILIO_WHATSAPP_TO")?;

        let body = alert_message(probability);

        let response = self
            .client
            .post(self.messages_url(account_sid))
            .basic_auth(account_sid, Some(auth_token))
            .form(&[("From", from), ("To", to), ("Body", body.as_str())])
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let created: MessageResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::Transport(format!("unreadable response: {}", e)))?;

        debug!(message_sid = %created.sid, probability = probability, "Published fraud alert");

        Ok(created.sid)
    }
}
