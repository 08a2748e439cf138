use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{FormSnapshot, HttpTransport, SubmissionController, SubmissionStatus};
use shared::domain::ContactField;
use tokio::sync::watch;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const SUCCESS_TEXT: &str = "Message sent successfully! Thank you.";
const CLEAR_ANSWER: &str = "-";

#[derive(Parser, Debug)]
#[command(about = "Send a message through the contact endpoint")]
struct Args {
    #[arg(long, default_value = "http://localhost:3002/api/contact")]
    endpoint: String,
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    message: Option<String>,
    /// Do not offer to edit and resend after a failure.
    #[arg(long)]
    once: bool,
}

impl Args {
    fn take_preset(&mut self, field: ContactField) -> Option<String> {
        match field {
            ContactField::Name => self.name.take(),
            ContactField::Email => self.email.take(),
            ContactField::Message => self.message.take(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut args = Args::parse();
    let transport = HttpTransport::new(&args.endpoint, Duration::from_secs(args.timeout_secs))
        .with_context(|| format!("cannot use endpoint '{}'", args.endpoint))?;
    let controller = SubmissionController::new(Arc::new(transport));
    let indicator = tokio::spawn(show_progress(controller.subscribe()));

    let delivered = loop {
        for field in ContactField::ALL {
            let value = match args.take_preset(field) {
                Some(value) => value,
                None => prompt(field, controller.form().get(field).to_string()).await?,
            };
            controller.update_field(field, value);
        }

        controller.submit().await;
        let snapshot = controller.snapshot();
        if let Some(line) = status_line(&snapshot.status) {
            println!("{line}");
        }

        match snapshot.status {
            SubmissionStatus::Succeeded => break true,
            _ if args.once => break false,
            _ => {
                if !confirm("Edit and try again? [y/N] ").await? {
                    break false;
                }
            }
        }
    };

    drop(controller);
    if let Err(error) = indicator.await {
        warn!(%error, "progress indicator task failed");
    }

    Ok(if delivered {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn status_line(status: &SubmissionStatus) -> Option<&str> {
    match status {
        SubmissionStatus::Idle => None,
        SubmissionStatus::Submitting => Some("Sending..."),
        SubmissionStatus::Succeeded => Some(SUCCESS_TEXT),
        SubmissionStatus::Failed { error_message } => Some(error_message),
    }
}

async fn show_progress(mut rx: watch::Receiver<FormSnapshot>) {
    while rx.changed().await.is_ok() {
        if rx.borrow_and_update().status.is_submitting() {
            println!("Sending...");
        }
    }
    debug!("form store closed");
}

/// Reads one field from stdin. An empty answer keeps `current`; `-` clears it.
async fn prompt(field: ContactField, current: String) -> Result<String> {
    let label = if current.is_empty() {
        format!("Your {field}: ")
    } else {
        format!("Your {field} [{current}] (Enter keeps, {CLEAR_ANSWER} clears): ")
    };
    let answer = read_line(label).await?;
    Ok(resolve_answer(answer, current))
}

fn resolve_answer(answer: String, current: String) -> String {
    if answer == CLEAR_ANSWER {
        String::new()
    } else if answer.is_empty() {
        current
    } else {
        answer
    }
}

async fn confirm(question: &'static str) -> Result<bool> {
    let answer = read_line(question.to_string()).await?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn read_line(label: String) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{label}")?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read from stdin")?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await
    .context("stdin reader stopped")?
}
