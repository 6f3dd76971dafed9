//! Mail adapters for the [`Mailer`] port.
//!
//! [`HttpMailRelay`] posts each message as JSON to a relay endpoint.
//! [`TracingMailer`] only logs the envelope and is used when no relay is
//! configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::domain::ports::{Mailer, MailerError, OutboundEmail};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// Relay client that delivers mail through an HTTP JSON endpoint.
pub struct HttpMailRelay {
    client: Client,
    endpoint: Url,
    from: String,
}

impl HttpMailRelay {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, from: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, from, DEFAULT_TIMEOUT)
    }

    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoint: Url,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from: from.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailRelay {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let body = RelayMessage {
            from: &self.from,
            to: email.to.as_ref(),
            subject: &email.subject,
            text: &email.text,
            html: &email.html,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(map_status_error(status));
        }
        info!(to = %email.to, subject = %email.subject, "mail handed to relay");
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    warn!(error = %error, "mail relay transport failed");
    MailerError::unavailable(error.to_string())
}

fn map_status_error(status: StatusCode) -> MailerError {
    let message = format!("relay responded with {status}");
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        MailerError::unavailable(message)
    } else {
        MailerError::rejected(message)
    }
}

/// Mailer that logs messages instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.text,
            "mail relay not configured; message logged only"
        );
        Ok(())
    }
}
