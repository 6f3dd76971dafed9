//! Test utilities for the catering crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled for tests or with the
//! `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{Mailer, MailerError, OutboundEmail};
use crate::domain::{Caller, Email, Role, UserId};

/// Deterministic instant used by fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).single() {
        Some(ts) => ts,
        None => panic!("valid fixture timestamp"),
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Shared clock starting at [`fixture_timestamp`].
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new(fixture_timestamp()))
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance(TimeDelta::minutes(minutes));
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Mailer that keeps every message for later inspection.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
    fail_with: Mutex<Option<MailerError>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("mailer mutex"),
        }
    }

    /// Make every later send fail with `error`.
    pub fn fail_with(&self, error: MailerError) {
        match self.fail_with.lock() {
            Ok(mut guard) => *guard = Some(error),
            Err(_) => panic!("mailer mutex"),
        }
    }

    /// The reset token carried by the most recent message, if any.
    pub fn last_reset_token(&self) -> Option<String> {
        self.sent().last().and_then(|email| {
            email
                .text
                .split("/reset-password/")
                .nth(1)
                .map(|rest| rest.chars().take_while(char::is_ascii_hexdigit).collect())
        })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        let failure = match self.fail_with.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => panic!("mailer mutex"),
        };
        if let Some(error) = failure {
            return Err(error);
        }
        match self.sent.lock() {
            Ok(mut guard) => guard.push(email.clone()),
            Err(_) => panic!("mailer mutex"),
        }
        Ok(())
    }
}

/// Build a caller with a fresh id.
pub fn caller(email: &str, role: Role) -> Caller {
    match Email::new(email) {
        Ok(email) => Caller::new(UserId::random(), email, role),
        Err(err) => panic!("fixture email: {err}"),
    }
}

/// Temporary directory for blob store tests; removed on drop.
pub fn temp_upload_dir() -> tempfile::TempDir {
    match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("temporary upload directory: {err}"),
    }
}
