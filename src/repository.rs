//! Backend-agnostic repository interface for prospect and lead records.
//!
//! The site has shipped against both a headless CMS and a hosted database
//! service; the workflow only depends on this capability set so the
//! concrete backend can be swapped without touching the state machine.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{AuditEntry, NewLead, NewProspect, ProspectUpdate};

/// Remote store for prospect and lead records, plus their side effects.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Create a provisional prospect record, returning its opaque identity.
    async fn create_prospect(&self, prospect: &NewProspect) -> Result<String, AppError>;

    /// Update an existing prospect in place.
    ///
    /// A uniqueness violation on the email must be reported as
    /// [`AppError::DuplicateEmail`] so the caller can fall back to creating
    /// a fresh prospect.
    async fn update_prospect(
        &self,
        prospect_id: &str,
        update: &ProspectUpdate,
    ) -> Result<(), AppError>;

    /// Create a permanent lead record, returning its opaque identity.
    async fn create_lead(&self, lead: &NewLead) -> Result<String, AppError>;

    /// Flag a prospect as converted into a lead. Best-effort.
    async fn mark_prospect_converted(&self, prospect_id: &str) -> Result<(), AppError>;

    /// Trigger the welcome notification for a freshly created lead.
    /// Callers ignore failures.
    async fn send_welcome_notification(&self, lead_id: &str) -> Result<(), AppError>;

    /// Append an audit-log entry. Callers ignore failures; logging must
    /// never break the main flow.
    async fn log_event(&self, entry: &AuditEntry) -> Result<(), AppError>;
}
