//! Terminal client for the registration verification flow.
//!
//! `register` submits the form and caches it in the session file;
//! `verify` mounts the verification page from its URL and submits a code.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;

use regverify::client::{
    HttpVerifyApi, Notice, PendingSubmission, SessionFile, SubmitOutcome, VerifyFlow, VerifyParams,
};
use regverify::otp::Channel;
use regverify::payloads::RegisterRequest;

#[derive(Parser)]
#[command(name = "verify-client", version, about = "Register and verify from the terminal")]
struct Cli {
    /// Where the pending submission is kept between commands.
    #[arg(long, default_value = "session.json")]
    session: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit the registration form and receive a verification link.
    Register {
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        base_url: Url,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone_number: String,
        #[arg(long)]
        vehicle_number: String,
    },
    /// Open a verification link and confirm the code.
    Verify {
        /// The full `/verify?email=..&tempId=..&phoneNumber=..` URL.
        url: Url,
        /// Verify by phone instead of email.
        #[arg(long)]
        phone: bool,
        /// Ask for a new code before prompting.
        #[arg(long)]
        resend: bool,
        /// The code; read from stdin when omitted.
        #[arg(long)]
        code: Option<String>,
    },
}

fn print_notices(flow: &mut VerifyFlow) {
    for notice in flow.take_notices() {
        if notice != Notice::Dismiss {
            println!("{}", notice);
        }
    }
}

fn read_code() -> Result<String> {
    print!("Code: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("Failed to read code")?;
    Ok(line)
}

async fn register(session: &SessionFile, base_url: Url, form: RegisterRequest) -> Result<()> {
    let api = HttpVerifyApi::new(base_url.clone());
    let registered = api.register(&form).await.context("Registration failed")?;

    let pending = PendingSubmission::with_form(serde_json::to_value(&form)?);
    session.save(&pending).context("Failed to cache pending submission")?;

    let params = VerifyParams {
        email: form.email,
        temp_id: registered.temp_id,
        phone_number: form.phone_number,
    };
    println!("Check your email, then run:");
    println!("  verify-client verify '{}'", params.page_url(&base_url));
    Ok(())
}

async fn verify(session: &SessionFile, url: Url, phone: bool, resend: bool, code: Option<String>) -> Result<()> {
    let mut flow = match VerifyFlow::mount(&url) {
        Ok(flow) => flow,
        Err(redirect) => {
            println!("Missing verification details, going to {}", redirect.to);
            return Ok(());
        }
    };

    let api = HttpVerifyApi::new(url.clone());
    if phone {
        flow.select_channel(Channel::Phone);
    }
    if resend {
        flow.resend(&api).await;
    }
    print_notices(&mut flow);
    println!("{}", flow.prompt());

    let code = match code {
        Some(code) => code,
        None => read_code()?,
    };
    flow.otp_mut().fill(&code);
    if !flow.can_submit() {
        bail!("Enter all 6 digits of the code");
    }

    let mut pending = session.load().context("Failed to read pending submission")?;
    let outcome = flow.submit(&api, &mut pending).await;
    print_notices(&mut flow);

    match outcome {
        SubmitOutcome::Verified(redirect) => {
            session.save(&pending).context("Failed to clear pending submission")?;
            let to = redirect.follow().await;
            println!("Redirected to {}", to);
            Ok(())
        }
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::NotReady => bail!("Verification already in progress"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let session = SessionFile::new(&cli.session);

    match cli.command {
        Command::Register {
            base_url,
            name,
            email,
            phone_number,
            vehicle_number,
        } => {
            let form = RegisterRequest {
                name,
                email,
                phone_number,
                vehicle_number,
            };
            register(&session, base_url, form).await
        }
        Command::Verify {
            url,
            phone,
            resend,
            code,
        } => verify(&session, url, phone, resend, code).await,
    }
}
