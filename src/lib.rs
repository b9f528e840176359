//! TF Lead Capture Library
//!
//! This library implements the contact-sidecart lead-capture workflow for
//! the studio's marketing site: progressive prospect creation, field-level
//! persistence, email validation, duplicate-email fallback and
//! durable-storage backed form resumption, posting prospect and lead
//! records to the CMS backend.
//!
//! # Modules
//!
//! - `attribution`: Campaign parameter capture (`utm_*`).
//! - `cms_client`: Headless-CMS REST implementation of the repository.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `models`: Form draft and wire payload models.
//! - `repository`: Backend-agnostic prospect/lead repository trait.
//! - `session_store`: Durable client-side session storage.
//! - `sidecart`: The capture-session state machine.
//! - `validation`: Email and required-field validation.

pub mod attribution;
pub mod cms_client;
pub mod config;
pub mod errors;
pub mod models;
pub mod repository;
pub mod session_store;
pub mod sidecart;
pub mod validation;

pub use attribution::Attribution;
pub use cms_client::CmsClient;
pub use errors::AppError;
pub use models::{FormDraft, FormField, NewLead, NewProspect, ProspectUpdate};
pub use repository::LeadRepository;
pub use session_store::SessionStore;
pub use sidecart::{CaptureSession, SessionOptions, SessionPhase};
