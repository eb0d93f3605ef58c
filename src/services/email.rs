use lettre::message::{header, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::SendError;
use crate::config::SmtpSettings;
use crate::otp::OtpCode;

fn email_error(e: impl std::fmt::Display) -> SendError {
    SendError::Email(e.to_string())
}

pub fn build_code_email(from: &str, to: &str, code: &OtpCode) -> Result<Message, SendError> {
    let html_body = format!(r#"
    <div style="background-color:#6b7280;padding:50px 0">
        <div style="max-width:500px;margin:0 auto;background:#f3f4f6;padding:40px;border-radius:8px;text-align:center;font-family:Arial,sans-serif;">
            <h1 style="color:#000">Verify Your Registration</h1>
            <p style="margin:20px 0;font-size:16px;color:#333">
                Enter this code on the verification page to finish registering
            </p>
            <h2 style="font-size:40px;letter-spacing:5px;color:green;margin:30px 0">{}</h2>
            <p style="color:#333">The code was requested for<br>
            <a style="color:#3b82f6;text-decoration:none;">{}</a></p>
        </div>
    </div>
    "#, code, to);

    Message::builder()
        .from(from.parse::<Mailbox>().map_err(email_error)?)
        .to(to.parse::<Mailbox>().map_err(email_error)?)
        .subject("Your verification code")
        .multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(format!("Your verification code is: {}", code)))
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(html_body),
                ),
        )
        .map_err(email_error)
}

pub async fn send_code_email(settings: &SmtpSettings, email: &str, code: &OtpCode) -> Result<(), SendError> {
    let message = build_code_email(&settings.email, email, code)?;

    let creds = Credentials::new(settings.email.clone(), settings.password.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
        .map_err(email_error)?
        .port(settings.port)
        .credentials(creds)
        .build();

    mailer.send(message).await.map_err(email_error)?;
    Ok(())
}
