use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attribution::Attribution;
use crate::validation::is_valid_email;

/// Status assigned to every freshly submitted lead.
pub const LEAD_STATUS_NEW: &str = "new";

// ============ Form State ============

/// The in-memory + persisted contact form draft.
///
/// Mutated on every keystroke and written to durable storage on every
/// change. Only `first_name`, `email`, `phone` and `training_goal` are
/// required, and only at final submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub training_goal: String,
    pub notes: String,
}

/// Names one of the six form fields, for `set_field`/blur events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
    TrainingGoal,
    Notes,
}

impl FormDraft {
    /// Overwrites a single field value.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::FirstName => self.first_name = value,
            FormField::LastName => self.last_name = value,
            FormField::Email => self.email = value,
            FormField::Phone => self.phone = value,
            FormField::TrainingGoal => self.training_goal = value,
            FormField::Notes => self.notes = value,
        }
    }

    /// Reads a single field value.
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::TrainingGoal => &self.training_goal,
            FormField::Notes => &self.notes,
        }
    }
}

// ============ Wire Payloads ============

/// Create-Prospect payload.
///
/// Optional contact fields default to empty strings; the training goal is
/// omitted from the payload entirely when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProspect {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_goal: Option<String>,
    /// Source tag for the capture channel (e.g. "website").
    pub source: String,
    pub captured_at: DateTime<Utc>,
    pub converted_to_lead: bool,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl NewProspect {
    pub fn from_draft(draft: &FormDraft, source: &str, attribution: &Attribution) -> Self {
        Self {
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            notes: draft.notes.clone(),
            training_goal: non_empty(&draft.training_goal),
            source: source.to_string(),
            captured_at: Utc::now(),
            converted_to_lead: false,
            attribution: attribution.clone(),
        }
    }
}

/// Update-Prospect payload.
///
/// The email is included only when it independently validates, so an
/// invalid in-progress edit never overwrites the stored valid email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_goal: Option<String>,
}

impl ProspectUpdate {
    pub fn from_draft(draft: &FormDraft) -> Self {
        Self {
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            phone: draft.phone.clone(),
            notes: draft.notes.clone(),
            email: if is_valid_email(&draft.email) {
                Some(draft.email.clone())
            } else {
                None
            },
            training_goal: non_empty(&draft.training_goal),
        }
    }
}

/// Create-Lead payload for a completed, validated submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub training_goal: String,
    pub notes: String,
    pub status: String,
    pub submitted_at: DateTime<Utc>,
    pub converted_to_user: bool,
    /// Back-reference to the originating prospect. Serialized as an
    /// explicit `null` when the form session never produced one.
    #[serde(rename = "prospect")]
    pub prospect_id: Option<String>,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl NewLead {
    pub fn from_draft(
        draft: &FormDraft,
        prospect_id: Option<String>,
        attribution: &Attribution,
    ) -> Self {
        Self {
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            training_goal: draft.training_goal.clone(),
            notes: draft.notes.clone(),
            status: LEAD_STATUS_NEW.to_string(),
            submitted_at: Utc::now(),
            converted_to_user: false,
            prospect_id,
            attribution: attribution.clone(),
        }
    }
}

// ============ Audit ============

/// Audit-log entry describing a workflow action on a remote entity.
///
/// Writes are best-effort; the event id is generated client-side so the
/// backend can deduplicate replays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub event_id: Uuid,
    /// Machine-readable action type, e.g. "prospect.created".
    pub action: String,
    /// Human-readable description of the action.
    pub description: String,
    /// Identity of the entity the action touched.
    pub entity_id: String,
    /// Snapshot of the form fields at the time of the action.
    pub fields: FormDraft,
    /// Snapshot of the attribution parameters carried by the session.
    pub attribution: Attribution,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn prospect_created(
        prospect_id: &str,
        draft: &FormDraft,
        attribution: &Attribution,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            action: "prospect.created".to_string(),
            description: format!("Prospect {} captured from contact form", prospect_id),
            entity_id: prospect_id.to_string(),
            fields: draft.clone(),
            attribution: attribution.clone(),
            at: Utc::now(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
