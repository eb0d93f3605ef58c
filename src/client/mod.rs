//! The verification page as a client-side state machine.
//!
//! [`VerifyFlow`] is mounted from the page URL, collects a code through
//! [`OtpInput`], and talks to the server through a [`VerifyApi`]. The form
//! cached between registration and verification travels as an explicit
//! [`PendingSubmission`] value.

mod api;
mod flow;
mod otp_input;
mod params;
mod pending;

pub use api::{ApiError, HttpVerifyApi, VerifyApi};
pub use flow::{Notice, Phase, SubmitOutcome, VerifyFlow};
pub use otp_input::OtpInput;
pub use params::{Redirect, VerifyParams, HOME_ROUTE, SUCCESS_REDIRECT_DELAY, SUCCESS_ROUTE, VERIFY_ROUTE};
pub use pending::{PendingSubmission, SessionError, SessionFile, PENDING_SUBMISSION_KEY};
