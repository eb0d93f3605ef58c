use std::sync::{Arc, Mutex, PoisonError};

use super::{CodeSender, SendError};
use crate::otp::{Channel, OtpCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub channel: Channel,
    pub destination: String,
    pub code: String,
}

/// Keeps every code it is asked to deliver, or fails every delivery.
#[derive(Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<SentCode>>>,
    failing: bool,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_code(&self, channel: Channel) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|s| s.channel == channel)
            .map(|s| s.code)
    }
}

impl CodeSender for RecordingSender {
    async fn send_code(&self, channel: Channel, destination: &str, code: &OtpCode) -> Result<(), SendError> {
        if self.failing {
            return Err(SendError::Sms("gateway unreachable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(SentCode {
                channel,
                destination: destination.to_string(),
                code: code.as_str().to_string(),
            });
        Ok(())
    }
}
