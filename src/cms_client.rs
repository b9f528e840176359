use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{AuditEntry, NewLead, NewProspect, ProspectUpdate};
use crate::repository::LeadRepository;

/// Client for the headless-CMS REST backend holding prospects and leads.
///
/// Talks Strapi-style endpoints: `{"data": ...}` request envelopes,
/// bearer-token auth, created records echoed back with their identity.
#[derive(Clone)]
pub struct CmsClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CmsClient {
    /// Creates a new `CmsClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the CMS API (e.g. `https://cms.example/api`).
    /// * `token` - The API token for authentication.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: String, token: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create CMS client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Pulls the created-record identity out of a CMS response.
    ///
    /// The id has moved across backend revisions; try the known locations
    /// in order: `data.documentId`, `data.id`, top-level `id` (string or
    /// number).
    fn extract_id(response: &serde_json::Value) -> Option<String> {
        let candidates = [
            response.get("data").and_then(|d| d.get("documentId")),
            response.get("data").and_then(|d| d.get("id")),
            response.get("id"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(id) = candidate.as_str() {
                return Some(id.to_string());
            }
            if let Some(id) = candidate.as_i64() {
                return Some(id.to_string());
            }
        }
        None
    }

    /// Whether an update-rejection body signals the email uniqueness
    /// constraint. The backend reports this in prose, so match the known
    /// phrasings.
    fn is_email_conflict(body: &str) -> bool {
        let body = body.to_lowercase();
        body.contains("email") || body.contains("unique") || body.contains("taken")
    }

    async fn post_entity(
        &self,
        path: &str,
        body: serde_json::Value,
        what: &str,
    ) -> Result<String, AppError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&json!({ "data": body }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("{} request failed: {}", what, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "{} creation failed {}: {}",
                what, status, error_text
            )));
        }

        let response_data: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse {} response: {}", what, e))
        })?;

        Self::extract_id(&response_data).ok_or_else(|| {
            tracing::warn!("Unexpected CMS response format: {:?}", response_data);
            AppError::ExternalApiError(format!("{} response missing 'id' field", what))
        })
    }
}

#[async_trait]
impl LeadRepository for CmsClient {
    async fn create_prospect(&self, prospect: &NewProspect) -> Result<String, AppError> {
        tracing::info!("Creating prospect in CMS: {}", prospect.email);
        let body = serde_json::to_value(prospect)
            .map_err(|e| AppError::InternalError(format!("prospect serialization: {}", e)))?;
        let id = self.post_entity("prospects", body, "Prospect").await?;
        tracing::info!("✓ Prospect created: {}", id);
        Ok(id)
    }

    async fn update_prospect(
        &self,
        prospect_id: &str,
        update: &ProspectUpdate,
    ) -> Result<(), AppError> {
        let url = format!("{}/prospects/{}", self.base_url, prospect_id);
        tracing::debug!("Updating prospect {} in CMS", prospect_id);

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.bearer())
            .json(&json!({ "data": update }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Prospect update failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            if Self::is_email_conflict(&error_text) {
                return Err(AppError::DuplicateEmail(error_text));
            }
            return Err(AppError::ExternalApiError(format!(
                "Prospect update failed {}: {}",
                status, error_text
            )));
        }

        tracing::debug!("✓ Prospect updated: {}", prospect_id);
        Ok(())
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<String, AppError> {
        tracing::info!("Creating lead in CMS: {}", lead.email);
        let body = serde_json::to_value(lead)
            .map_err(|e| AppError::InternalError(format!("lead serialization: {}", e)))?;
        let id = self.post_entity("leads", body, "Lead").await?;
        tracing::info!("✓ Lead created: {}", id);
        Ok(id)
    }

    async fn mark_prospect_converted(&self, prospect_id: &str) -> Result<(), AppError> {
        let url = format!("{}/prospects/{}", self.base_url, prospect_id);
        let response = self
            .client
            .put(&url)
            .header("Authorization", self.bearer())
            .json(&json!({ "data": { "convertedToLead": true } }))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Convert-flag update failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApiError(format!(
                "Convert-flag update failed {}",
                status
            )));
        }

        tracing::info!("✓ Prospect {} marked converted", prospect_id);
        Ok(())
    }

    async fn send_welcome_notification(&self, lead_id: &str) -> Result<(), AppError> {
        let url = format!("{}/leads/{}/send-welcome", self.base_url, lead_id);
        tracing::info!("Triggering welcome notification for lead {}", lead_id);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bearer())
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Welcome notification failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApiError(format!(
                "Welcome notification failed {}",
                status
            )));
        }

        Ok(())
    }

    async fn log_event(&self, entry: &AuditEntry) -> Result<(), AppError> {
        let body = serde_json::to_value(entry)
            .map_err(|e| AppError::InternalError(format!("audit serialization: {}", e)))?;
        self.post_entity("audit-logs", body, "Audit entry").await?;
        Ok(())
    }
}
