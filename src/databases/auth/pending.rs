use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::otp::Channel;

/// A registration waiting for its code to be confirmed, keyed by `temp_id`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PendingRegistration {
    pub temp_id: String,
    pub email: String,
    pub phone_number: String,
    pub email_code_hash: Option<String>,
    pub email_code_expires_at: Option<DateTime<Utc>>,
    pub phone_code_hash: Option<String>,
    pub phone_code_expires_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub created_at: DateTime<Utc>,
}

/// The code currently issued on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedCode<'a> {
    pub hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

pub fn new_temp_id() -> String {
    format!("signup{}", Uuid::new_v4())
}

impl PendingRegistration {
    pub fn new(email: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            temp_id: new_temp_id(),
            email: email.into(),
            phone_number: phone_number.into(),
            email_code_hash: None,
            email_code_expires_at: None,
            phone_code_hash: None,
            phone_code_expires_at: None,
            attempts: 0,
            created_at: Utc::now(),
        }
    }

    /// Replaces the code for `channel` and resets the failed attempt counter.
    pub fn with_code(mut self, channel: Channel, hash: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        self.set_code(channel, hash, expires_at);
        self
    }

    pub fn set_code(&mut self, channel: Channel, hash: impl Into<String>, expires_at: DateTime<Utc>) {
        match channel {
            Channel::Email => {
                self.email_code_hash = Some(hash.into());
                self.email_code_expires_at = Some(expires_at);
            }
            Channel::Phone => {
                self.phone_code_hash = Some(hash.into());
                self.phone_code_expires_at = Some(expires_at);
            }
        }
        self.attempts = 0;
    }

    pub fn issued_code(&self, channel: Channel) -> Option<IssuedCode<'_>> {
        let (hash, expires_at) = match channel {
            Channel::Email => (&self.email_code_hash, self.email_code_expires_at),
            Channel::Phone => (&self.phone_code_hash, self.phone_code_expires_at),
        };
        Some(IssuedCode {
            hash: hash.as_deref()?,
            expires_at: expires_at?,
        })
    }

    /// Email compares case-insensitively, phone number exactly (after trimming).
    pub fn matches_identity(&self, email: &str, phone_number: &str) -> bool {
        self.email.trim().eq_ignore_ascii_case(email.trim()) && self.phone_number.trim() == phone_number.trim()
    }

    pub fn destination(&self, channel: Channel) -> &str {
        match channel {
            Channel::Email => &self.email,
            Channel::Phone => &self.phone_number,
        }
    }
}
