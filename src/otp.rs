//! One-time codes: delivery channels, the 6-digit code type and the policy
//! governing how long a code lives and how many wrong guesses it tolerates.

use std::fmt;
use std::str::FromStr;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Number of digits in a code.
pub const OTP_LEN: usize = 6;

/// Where a code is delivered and which issued code a submission is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Email,
    Phone,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Phone => "phone",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Channel::Email => Channel::Phone,
            Channel::Phone => Channel::Email,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("Code must be exactly 6 digits")]
    Malformed,
    #[error("Failed to hash code: {0}")]
    Hash(String),
}

/// A code of exactly [`OTP_LEN`] ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Parses user input; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, OtpError> {
        let raw = raw.trim();
        if raw.len() == OTP_LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(OtpError::Malformed)
        }
    }

    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{:06}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Argon2 PHC string suitable for storage.
    pub fn hash(&self) -> Result<String, OtpError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| OtpError::Hash(e.to_string()))
    }

    /// Checks the code against a stored hash. An unparseable hash never matches.
    pub fn matches(&self, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(self.0.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl FromStr for OtpCode {
    type Err = OtpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keeps codes out of `{:?}` log lines.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpPolicy {
    pub ttl: Duration,
    pub max_attempts: i32,
}

impl Default for OtpPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(10),
            max_attempts: 5,
        }
    }
}

impl OtpPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ttl: Duration::seconds(config.otp_ttl_secs),
            max_attempts: config.otp_max_attempts,
        }
    }
}
