//! Contact-sidecart lead-capture workflow.
//!
//! One session-scoped state machine tying the pieces together:
//! 1. Field edits mutate the draft and mirror it to durable storage
//! 2. Field blurs upsert a provisional prospect (best-effort enrichment)
//! 3. Explicit submission converts the draft into a permanent lead
//! 4. Success clears the session so the next visitor starts fresh

use std::sync::Arc;
use std::time::Duration;

use crate::attribution::Attribution;
use crate::errors::{AppError, ResultExt};
use crate::models::{AuditEntry, FormDraft, FormField, NewLead, NewProspect, ProspectUpdate};
use crate::repository::LeadRepository;
use crate::session_store::SessionStore;
use crate::validation::{is_valid_email, missing_required_fields};

/// User-facing message shown when the email fails validation on blur.
pub const EMAIL_VALIDATION_MESSAGE: &str =
    "Por favor ingresa un email válido (ej: usuario@ejemplo.com)";

/// Lifecycle of the session-scoped prospect record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProspectState {
    /// No prospect captured yet.
    None,
    /// Prospect identity known; subsequent blurs update it in place.
    Active(String),
}

/// Where the form UI currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Editing,
    Submitting,
    /// Submission succeeded; held for a fixed display duration before the
    /// session resets.
    Success,
}

/// Tunables for a capture session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Source tag attached to every prospect (e.g. "website").
    pub source_tag: String,
    /// Page URL the visitor landed on, consulted once for `utm_*` params.
    pub landing_url: Option<String>,
    /// How long the success state is shown before the form resets.
    pub success_display: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            source_tag: "website".to_string(),
            landing_url: None,
            success_display: Duration::from_secs(2),
        }
    }
}

/// The lead-capture state machine: form state store, prospect lifecycle
/// manager and lead submitter over one visitor session.
///
/// Single-task and event-driven: [`field_blur`](Self::field_blur) and
/// [`submit`](Self::submit) are the only suspension points. Overlapping
/// blur-triggered calls are last-write-wins; only the submission path is
/// serialized, by the submitting flag.
pub struct CaptureSession {
    repo: Arc<dyn LeadRepository>,
    store: SessionStore,
    draft: FormDraft,
    prospect: ProspectState,
    attribution: Attribution,
    options: SessionOptions,
    email_error: Option<String>,
    submitting: bool,
    phase: SessionPhase,
}

impl CaptureSession {
    /// Starts a session, resuming any draft and prospect identity left in
    /// durable storage by a previous visit. Run once per session start.
    pub fn resume(
        repo: Arc<dyn LeadRepository>,
        mut store: SessionStore,
        options: SessionOptions,
    ) -> Self {
        let attribution = Attribution::resolve(options.landing_url.as_deref(), &mut store);
        let snapshot = store.load();
        if snapshot.draft.is_some() || snapshot.prospect_id.is_some() {
            tracing::info!(
                "Resuming saved session (prospect: {})",
                snapshot.prospect_id.as_deref().unwrap_or("none")
            );
        }
        let prospect = match snapshot.prospect_id {
            Some(id) => ProspectState::Active(id),
            None => ProspectState::None,
        };
        Self {
            repo,
            store,
            draft: snapshot.draft.unwrap_or_default(),
            prospect,
            attribution,
            options,
            email_error: None,
            submitting: false,
            phase: SessionPhase::Editing,
        }
    }

    /// Updates one field and mirrors the full draft to durable storage.
    ///
    /// Pure capture: no validation, no remote calls. The write happens
    /// before any network activity this edit may later trigger.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.draft.set(field, value);
        self.store.save_draft(&self.draft);
    }

    /// Handles a field losing focus.
    ///
    /// Fire-and-forget from the UI's perspective: enrichment failures are
    /// logged, never surfaced, never retried automatically. The only
    /// user-visible outcome is the email validation message, exposed via
    /// [`email_error`](Self::email_error).
    pub async fn field_blur(&mut self, field: FormField) {
        if field == FormField::Email {
            self.email_error = None;
            if self.draft.email.is_empty() {
                // Not entered yet; nothing to validate or capture.
                return;
            }
            if !is_valid_email(&self.draft.email) {
                tracing::warn!("⚠ Invalid email on blur: {}", self.draft.email);
                self.email_error = Some(EMAIL_VALIDATION_MESSAGE.to_string());
                return;
            }
        }

        match self.prospect.clone() {
            ProspectState::Active(id) => self.update_prospect(&id).await,
            ProspectState::None => {
                // A failed create is retried on the next blur of any field,
                // as long as the email holds up.
                if is_valid_email(&self.draft.email) {
                    self.create_prospect().await;
                }
            }
        }
    }

    /// Submits the completed form as a lead.
    ///
    /// Blocking errors (validation, lead-creation failure) are returned to
    /// the caller; on success the draft and prospect identity are cleared
    /// after the configured success display and `close` is invoked.
    pub async fn submit(&mut self, close: impl FnOnce()) -> Result<(), AppError> {
        if self.submitting {
            // Submit control is disabled while a submission is in flight.
            tracing::debug!("Ignoring submit: submission already in progress");
            return Ok(());
        }

        let missing = missing_required_fields(&self.draft);
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Por favor completa todos los campos requeridos: {}",
                missing.join(", ")
            )));
        }

        self.submitting = true;
        self.phase = SessionPhase::Submitting;

        let prospect_id = match &self.prospect {
            ProspectState::Active(id) => Some(id.clone()),
            ProspectState::None => None,
        };
        let lead = NewLead::from_draft(&self.draft, prospect_id.clone(), &self.attribution);

        let lead_id = match self.repo.create_lead(&lead).await {
            Ok(id) => id,
            Err(e) => {
                // Draft stays intact so the user can retry without
                // re-entering data.
                self.submitting = false;
                self.phase = SessionPhase::Editing;
                tracing::error!("✗ Lead creation failed: {}", e);
                return Err(e).context("No se pudo enviar el formulario");
            }
        };
        tracing::info!("✓ Lead created: {}", lead_id);

        // Lead creation is the transaction boundary; the convert flag is
        // advisory and must not roll anything back.
        if let Some(id) = &prospect_id {
            if let Err(e) = self.repo.mark_prospect_converted(id).await {
                tracing::warn!("Convert-flag update failed for prospect {}: {}", id, e);
            }
        }

        // Welcome notification must not block or fail the submission flow.
        let repo = Arc::clone(&self.repo);
        let welcome_lead_id = lead_id.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.send_welcome_notification(&welcome_lead_id).await {
                tracing::warn!(
                    "Welcome notification failed for lead {}: {}",
                    welcome_lead_id,
                    e
                );
            }
        });

        self.phase = SessionPhase::Success;
        tokio::time::sleep(self.options.success_display).await;

        self.reset();
        self.submitting = false;
        self.phase = SessionPhase::Editing;
        close();
        Ok(())
    }

    /// Clears the in-memory draft and prospect identity, and deletes both
    /// entries from durable storage.
    pub fn reset(&mut self) {
        self.draft = FormDraft::default();
        self.prospect = ProspectState::None;
        self.email_error = None;
        self.store.clear_session();
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    /// The current email validation message, if the last email blur failed.
    pub fn email_error(&self) -> Option<&str> {
        self.email_error.as_deref()
    }

    pub fn prospect_id(&self) -> Option<&str> {
        match &self.prospect {
            ProspectState::Active(id) => Some(id),
            ProspectState::None => None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    async fn create_prospect(&mut self) {
        let payload = NewProspect::from_draft(&self.draft, &self.options.source_tag, &self.attribution);
        match self.repo.create_prospect(&payload).await {
            Ok(id) => {
                self.store.save_prospect_id(&id);
                let entry = AuditEntry::prospect_created(&id, &self.draft, &self.attribution);
                if let Err(e) = self.repo.log_event(&entry).await {
                    tracing::warn!("Audit log write failed for prospect {}: {}", id, e);
                }
                self.prospect = ProspectState::Active(id);
            }
            Err(e) => {
                // Stay in None; the next blur attempts creation again.
                tracing::warn!("Prospect creation failed: {}", e);
            }
        }
    }

    async fn update_prospect(&mut self, prospect_id: &str) {
        let update = ProspectUpdate::from_draft(&self.draft);
        match self.repo.update_prospect(prospect_id, &update).await {
            Ok(()) => {}
            Err(AppError::DuplicateEmail(msg)) => {
                // Policy: prefer a duplicate prospect record over losing the
                // visitor's data or blocking the form.
                tracing::warn!(
                    "⚠ Email already belongs to another record ({}); creating a fresh prospect",
                    msg
                );
                self.create_prospect().await;
            }
            Err(e) => {
                tracing::warn!("Prospect update failed for {}: {}", prospect_id, e);
            }
        }
    }
}
