//! Command-line application form: submits a resume to the intake API and
//! prints the resulting form state.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use resume_intake::client::{ApplicationForm, ApplyClient, SubmissionState, DEFAULT_ENDPOINT};
use resume_intake::telemetry;

#[derive(Parser, Debug)]
#[command(name = "apply", about = "Submit a job application with a resume", version)]
struct Cli {
    /// Applicant's full name
    #[arg(long)]
    full_name: String,
    /// Applicant's email address
    #[arg(long)]
    email: String,
    /// Resume file to upload
    #[arg(long)]
    resume: PathBuf,
    /// Submission endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,
    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level);

    let client = ApplyClient::new(cli.endpoint);
    let mut form = ApplicationForm::new(cli.full_name, cli.email, Some(cli.resume));

    let state = form
        .submit_with(&client, |state| {
            if let Some(message) = state.message() {
                println!("{message}");
            }
        })
        .await;

    match state {
        SubmissionState::Err { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}
