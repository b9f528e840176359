//! Terminal rendition of the contact sidecart.
//!
//! Drives the lead-capture workflow against the configured CMS backend:
//! each field command edits the draft and fires the blur handler, `submit`
//! runs the full submission path. Sessions resume from the store file.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tf_lead_capture::config::Config;
use tf_lead_capture::models::FormField;
use tf_lead_capture::sidecart::{CaptureSession, SessionOptions};
use tf_lead_capture::{CmsClient, SessionStore};

const HELP: &str = "\
commands:
  first <v> | last <v> | email <v> | phone <v> | goal <v> | notes <v>
  show      print the current draft and prospect state
  submit    send the completed form as a lead
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tf_lead_capture=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let client = CmsClient::new(
        config.cms_base_url.clone(),
        config.cms_token.clone(),
        config.request_timeout(),
    )?;
    tracing::info!("✓ CMS client initialized: {}", config.cms_base_url);

    let store = SessionStore::open(&config.session_store_path);
    let options = SessionOptions {
        source_tag: config.source_tag.clone(),
        landing_url: config.landing_url.clone(),
        success_display: config.success_display(),
    };
    let mut session = CaptureSession::resume(Arc::new(client), store, options);

    println!("TF contact sidecart — {}", HELP);
    print_draft(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, value) = match line.split_once(' ') {
            Some((command, value)) => (command, value.trim()),
            None => (line, ""),
        };

        let field = match command {
            "first" => Some(FormField::FirstName),
            "last" => Some(FormField::LastName),
            "email" => Some(FormField::Email),
            "phone" => Some(FormField::Phone),
            "goal" => Some(FormField::TrainingGoal),
            "notes" => Some(FormField::Notes),
            _ => None,
        };

        match (command, field) {
            (_, Some(field)) => {
                session.set_field(field, value);
                session.field_blur(field).await;
                if let Some(message) = session.email_error() {
                    println!("! {}", message);
                }
            }
            ("show", _) => print_draft(&session),
            ("submit", _) => match session.submit(|| println!("(sidecart closed)")).await {
                Ok(()) => println!("¡Gracias por contactarnos!"),
                Err(e) => println!("! {}", e),
            },
            ("quit" | "exit", _) => break,
            _ => println!("{}", HELP),
        }
    }

    Ok(())
}

fn print_draft(session: &CaptureSession) {
    let draft = session.draft();
    println!(
        "draft: first={:?} last={:?} email={:?} phone={:?} goal={:?} notes={:?}",
        draft.first_name,
        draft.last_name,
        draft.email,
        draft.phone,
        draft.training_goal,
        draft.notes,
    );
    println!("prospect: {}", session.prospect_id().unwrap_or("none"));
}
