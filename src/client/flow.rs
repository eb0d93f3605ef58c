use log::{info, warn};
use reqwest::Url;
use std::fmt;

use super::api::VerifyApi;
use super::otp_input::OtpInput;
use super::params::{Redirect, VerifyParams, SUCCESS_REDIRECT_DELAY, SUCCESS_ROUTE};
use super::pending::PendingSubmission;
use crate::otp::Channel;
use crate::payloads::{ResendOtpRequest, VerifyOtpRequest};

const VERIFYING: &str = "Verifying...";
const VERIFIED: &str = "Verification successful!";
const VERIFY_FAILED: &str = "Verification failed";
const NO_PENDING_SUBMISSION: &str = "No pending submission found";
const RESEND_FAILED: &str = "Failed to resend OTP";
const PHONE_CODE_SENT: &str = "OTP sent to your phone number";
const PHONE_HINT: &str = "Click \"Resend Code\" to get OTP on your phone";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Verifying,
    Success,
    Failed,
}

/// Transient notifications the page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Loading(String),
    /// Removes the current loading notice.
    Dismiss,
    Success(String),
    Error(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Loading(m) => write!(f, "Loading: {}", m),
            Notice::Dismiss => Ok(()),
            Notice::Success(m) => write!(f, "Success: {}", m),
            Notice::Error(m) => write!(f, "Error: {}", m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Verified(Redirect),
    Failed(String),
    /// Submit was not possible: a verification is in flight or the code is incomplete.
    NotReady,
}

#[derive(Debug, Clone)]
pub struct VerifyFlow {
    params: VerifyParams,
    channel: Channel,
    otp: OtpInput,
    phase: Phase,
    notices: Vec<Notice>,
}

impl VerifyFlow {
    pub fn new(params: VerifyParams) -> Self {
        Self {
            params,
            channel: Channel::Email,
            otp: OtpInput::new(),
            phase: Phase::Idle,
            notices: Vec::new(),
        }
    }

    /// Mounts the page from its URL, or says where to go instead.
    pub fn mount(url: &Url) -> Result<Self, Redirect> {
        VerifyParams::from_url(url).map(Self::new)
    }

    pub fn params(&self) -> &VerifyParams {
        &self.params
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn select_channel(&mut self, channel: Channel) {
        self.channel = channel;
        if channel == Channel::Phone {
            self.notices.push(Notice::Success(PHONE_HINT.to_string()));
        }
    }

    pub fn prompt(&self) -> String {
        let destination = match self.channel {
            Channel::Email => &self.params.email,
            Channel::Phone => &self.params.phone_number,
        };
        format!("We've sent a verification code to {}", destination)
    }

    pub fn otp(&self) -> &OtpInput {
        &self.otp
    }

    pub fn otp_mut(&mut self) -> &mut OtpInput {
        &mut self.otp
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Verifying && self.otp.is_complete()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Sends the code with the cached form. On success the cached form is
    /// cleared and the returned redirect points at the success page.
    pub async fn submit<A: VerifyApi>(&mut self, api: &A, pending: &mut PendingSubmission) -> SubmitOutcome {
        if !self.can_submit() {
            return SubmitOutcome::NotReady;
        }
        let Some(code) = self.otp.code() else {
            return SubmitOutcome::NotReady;
        };

        self.phase = Phase::Verifying;
        self.notices.push(Notice::Loading(VERIFYING.to_string()));

        let result = match pending.get() {
            None => Err(NO_PENDING_SUBMISSION.to_string()),
            Some(form) => {
                let request = VerifyOtpRequest {
                    email: self.params.email.clone(),
                    phone_number: self.params.phone_number.clone(),
                    otp: code.as_str().to_string(),
                    temp_id: self.params.temp_id.clone(),
                    form_data: form.clone(),
                    method: self.channel,
                };
                api.verify_otp(&request).await.map_err(|e| match e.server_message() {
                    Some(message) => message.to_string(),
                    None => {
                        warn!("Verification request failed: {}", e);
                        VERIFY_FAILED.to_string()
                    }
                })
            }
        };

        self.notices.push(Notice::Dismiss);
        match result {
            Ok(()) => {
                info!("Verified {} via {}", self.params.temp_id, self.channel);
                self.notices.push(Notice::Success(VERIFIED.to_string()));
                pending.clear();
                self.phase = Phase::Success;
                SubmitOutcome::Verified(Redirect::delayed(SUCCESS_ROUTE, SUCCESS_REDIRECT_DELAY))
            }
            Err(message) => {
                self.notices.push(Notice::Error(message.clone()));
                self.phase = Phase::Failed;
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Asks for a new code on the selected channel. Email resends succeed
    /// silently; phone resends confirm.
    pub async fn resend<A: VerifyApi>(&mut self, api: &A) -> bool {
        let request = ResendOtpRequest {
            email: self.params.email.clone(),
            phone_number: self.params.phone_number.clone(),
            temp_id: self.params.temp_id.clone(),
            method: self.channel,
        };

        match api.resend_otp(&request).await {
            Ok(()) => {
                if self.channel == Channel::Phone {
                    self.notices.push(Notice::Success(PHONE_CODE_SENT.to_string()));
                }
                true
            }
            Err(e) => {
                warn!("Resend failed: {}", e);
                self.notices.push(Notice::Error(RESEND_FAILED.to_string()));
                false
            }
        }
    }
}
