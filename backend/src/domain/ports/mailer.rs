//! Port for outbound email delivery.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The relay could not be reached.
        Unavailable { message: String } => "mail relay unavailable: {message}",
        /// The relay refused the message.
        Rejected { message: String } => "mail relay rejected message: {message}",
    }
}

/// A message ready to send, with plain-text and HTML bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub to: Email,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// Mailer that accepts and drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailer;

#[async_trait]
impl Mailer for FixtureMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), MailerError> {
        Ok(())
    }
}
