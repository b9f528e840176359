use serde::{Deserialize, Serialize};
use url::Url;

use crate::session_store::SessionStore;

/// Campaign-tracking parameters captured from the landing page URL and
/// carried through to both prospect and lead records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

impl Attribution {
    /// True when no campaign parameter was captured at all.
    pub fn is_empty(&self) -> bool {
        self.utm_source.is_none()
            && self.utm_medium.is_none()
            && self.utm_campaign.is_none()
            && self.utm_term.is_none()
            && self.utm_content.is_none()
    }

    /// Extracts `utm_*` query parameters from a page URL.
    ///
    /// Empty parameter values are ignored, so `?utm_source=` does not
    /// overwrite a stored attribution with a blank one.
    pub fn from_url(url: &Url) -> Self {
        let mut attribution = Attribution::default();
        for (key, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let value = value.into_owned();
            match key.as_ref() {
                "utm_source" => attribution.utm_source = Some(value),
                "utm_medium" => attribution.utm_medium = Some(value),
                "utm_campaign" => attribution.utm_campaign = Some(value),
                "utm_term" => attribution.utm_term = Some(value),
                "utm_content" => attribution.utm_content = Some(value),
                _ => {}
            }
        }
        attribution
    }

    /// Resolves the attribution for a new workflow session.
    ///
    /// The landing URL is consulted once at workflow start; parameters found
    /// there win and are persisted for future sessions. When the URL carries
    /// none (or fails to parse), the copy in durable storage is the fallback.
    pub fn resolve(landing_url: Option<&str>, store: &mut SessionStore) -> Self {
        if let Some(raw) = landing_url {
            match Url::parse(raw) {
                Ok(url) => {
                    let attribution = Self::from_url(&url);
                    if !attribution.is_empty() {
                        store.save_attribution(&attribution);
                        return attribution;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to parse landing URL '{}': {}", raw, e);
                }
            }
        }
        store.load().attribution.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_utm_parameters_from_url() {
        let url = Url::parse(
            "https://tf.example/landing?utm_source=instagram&utm_medium=social&utm_campaign=apertura&ref=abc",
        )
        .unwrap();
        let attribution = Attribution::from_url(&url);
        assert_eq!(attribution.utm_source.as_deref(), Some("instagram"));
        assert_eq!(attribution.utm_medium.as_deref(), Some("social"));
        assert_eq!(attribution.utm_campaign.as_deref(), Some("apertura"));
        assert_eq!(attribution.utm_term, None);
        assert_eq!(attribution.utm_content, None);
    }

    #[test]
    fn url_without_parameters_is_empty() {
        let url = Url::parse("https://tf.example/landing").unwrap();
        assert!(Attribution::from_url(&url).is_empty());
    }

    #[test]
    fn blank_parameter_values_are_ignored() {
        let url = Url::parse("https://tf.example/?utm_source=&utm_medium=social").unwrap();
        let attribution = Attribution::from_url(&url);
        assert_eq!(attribution.utm_source, None);
        assert_eq!(attribution.utm_medium.as_deref(), Some("social"));
    }

    #[test]
    fn empty_fields_are_omitted_from_wire_payload() {
        let attribution = Attribution {
            utm_source: Some("google".to_string()),
            ..Attribution::default()
        };
        let json = serde_json::to_value(&attribution).unwrap();
        assert_eq!(json, serde_json::json!({ "utmSource": "google" }));
    }
}
