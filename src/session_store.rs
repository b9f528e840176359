use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::attribution::Attribution;
use crate::models::FormDraft;

/// Storage key for the serialized form draft.
pub const DRAFT_KEY: &str = "contactFormData";
/// Storage key for the session-scoped prospect identity.
pub const PROSPECT_ID_KEY: &str = "prospectId";
/// Storage key for the persisted attribution parameters.
pub const ATTRIBUTION_KEY: &str = "attribution";

/// Session state hydrated from durable storage at workflow start.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub draft: Option<FormDraft>,
    pub prospect_id: Option<String>,
    pub attribution: Option<Attribution>,
}

/// Durable client-side key-value storage backing form resumption.
///
/// A JSON file of string keys to string values, standing in for browser
/// localStorage: structured values are stored string-serialized, writes are
/// synchronous and unconditional, and a corrupt or unreadable file degrades
/// to an empty session rather than failing the workflow.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl SessionStore {
    /// Opens the store at `path`, reading any previously persisted session.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Session store at {} is corrupt, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// Raw read of a storage slot.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Raw write of a storage slot; flushed to disk immediately.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
        self.flush();
    }

    /// Removes a storage slot; flushed to disk immediately.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.flush();
    }

    /// Hydrates the persisted session.
    ///
    /// The literal strings "undefined" and "null" in the prospect-id slot
    /// are sentinels left behind by earlier revisions and mean "no
    /// prospect". A draft or attribution entry that no longer parses is
    /// dropped with a warning.
    pub fn load(&self) -> SessionSnapshot {
        let draft = self.get(DRAFT_KEY).and_then(|raw| {
            serde_json::from_str::<FormDraft>(raw)
                .map_err(|e| tracing::warn!("Discarding unparseable saved draft: {}", e))
                .ok()
        });
        let prospect_id = self
            .get(PROSPECT_ID_KEY)
            .filter(|id| !id.is_empty() && *id != "undefined" && *id != "null")
            .map(str::to_string);
        let attribution = self.get(ATTRIBUTION_KEY).and_then(|raw| {
            serde_json::from_str::<Attribution>(raw)
                .map_err(|e| tracing::warn!("Discarding unparseable saved attribution: {}", e))
                .ok()
        });
        SessionSnapshot {
            draft,
            prospect_id,
            attribution,
        }
    }

    /// Persists the full draft. Called on every field change, before any
    /// remote call is attempted.
    pub fn save_draft(&mut self, draft: &FormDraft) {
        match serde_json::to_string(draft) {
            Ok(serialized) => self.set(DRAFT_KEY, serialized),
            Err(e) => tracing::error!("Failed to serialize draft: {}", e),
        }
    }

    /// Persists the session's prospect identity.
    pub fn save_prospect_id(&mut self, prospect_id: &str) {
        self.set(PROSPECT_ID_KEY, prospect_id);
    }

    /// Persists the attribution parameters captured for this visitor.
    pub fn save_attribution(&mut self, attribution: &Attribution) {
        match serde_json::to_string(attribution) {
            Ok(serialized) => self.set(ATTRIBUTION_KEY, serialized),
            Err(e) => tracing::error!("Failed to serialize attribution: {}", e),
        }
    }

    /// Deletes the draft and prospect-id entries.
    ///
    /// Invoked only after a successful lead creation. Attribution is kept:
    /// the visitor's campaign origin outlives a single form session.
    pub fn clear_session(&mut self) {
        self.entries.remove(DRAFT_KEY);
        self.entries.remove(PROSPECT_ID_KEY);
        self.flush();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Synchronous write-then-rename so a crash mid-write never leaves a
    // torn file behind. Local writes are cheap; failures are logged and
    // never break the form.
    fn flush(&self) {
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(serialized) => serialized,
            Err(e) => {
                tracing::error!("Failed to serialize session store: {}", e);
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        let result = fs::write(&tmp, serialized).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = result {
            tracing::error!(
                "Failed to persist session store at {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
