//! Code delivery over email (SMTP) and phone (HTTP SMS gateway).

use log::{info, warn};
use reqwest::Client;
use std::future::Future;

use crate::config::{Config, SmsSettings, SmtpSettings};
use crate::otp::{Channel, OtpCode};

pub mod email;
#[cfg(test)]
pub mod recording;
pub mod sms;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("email delivery failed: {0}")]
    Email(String),

    #[error("sms delivery failed: {0}")]
    Sms(String),
}

pub trait CodeSender: Clone + Send + Sync + 'static {
    fn send_code(
        &self,
        channel: Channel,
        destination: &str,
        code: &OtpCode,
    ) -> impl Future<Output = Result<(), SendError>> + Send;
}

/// Delivers codes with whatever transports are configured. An unconfigured
/// channel logs the code instead, which is how local development works.
#[derive(Clone)]
pub struct Messenger {
    smtp: Option<SmtpSettings>,
    sms: Option<SmsSettings>,
    http: Client,
}

impl Messenger {
    pub fn new(config: &Config) -> Self {
        Self {
            smtp: config.smtp.clone(),
            sms: config.sms.clone(),
            http: Client::new(),
        }
    }
}

impl CodeSender for Messenger {
    async fn send_code(&self, channel: Channel, destination: &str, code: &OtpCode) -> Result<(), SendError> {
        match (channel, &self.smtp, &self.sms) {
            (Channel::Email, Some(smtp), _) => email::send_code_email(smtp, destination, code).await?,
            (Channel::Phone, _, Some(sms)) => sms::send_code_sms(&self.http, sms, destination, code).await?,
            _ => {
                warn!("No {} transport configured, code for {} is {}", channel, destination, code);
                return Ok(());
            }
        }

        info!("Sent {} code to {}", channel, destination);
        Ok(())
    }
}
