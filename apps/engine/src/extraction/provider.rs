//! Extraction provider trait — pluggable enrichment backends.
//!
//! The engine carries an `Option<Arc<dyn ExtractionProvider>>` and works
//! correctly with none at all (pure heuristic mode). Implement this trait to
//! swap backends without touching the extractor or the pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::models::posting::CanonicalText;
use crate::models::requirement::{Education, RemotePolicy, Seniority};

/// One enriched field with the provider's own confidence in it. A field only
/// overrides the heuristic value when this confidence beats the heuristic
/// tier's overall confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderField<T> {
    pub value: T,
    /// In [0, 1].
    pub confidence: f32,
}

/// Structured response from an enrichment provider. Absent fields mean the
/// provider had nothing to say about them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderFields {
    #[serde(default)]
    pub required_skills: Option<ProviderField<Vec<String>>>,
    #[serde(default)]
    pub preferred_skills: Option<ProviderField<Vec<String>>>,
    #[serde(default)]
    pub min_experience_years: Option<ProviderField<f32>>,
    #[serde(default)]
    pub seniority: Option<ProviderField<Seniority>>,
    #[serde(default)]
    pub education: Option<ProviderField<Education>>,
    #[serde(default)]
    pub remote_policy: Option<ProviderField<RemotePolicy>>,
}

/// An external text-understanding service that can refine heuristic
/// extraction. Any error from `submit` triggers the heuristic fallback path;
/// it never fails an extraction.
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    async fn submit(&self, canon: &CanonicalText) -> Result<ProviderFields, ProviderError>;

    /// Backend label for logging and transparency.
    fn name(&self) -> &'static str;
}

/// Provider that enriches nothing. Keeps the provider code path exercised in
/// tests without network access.
pub struct NoopProvider;

#[async_trait]
impl ExtractionProvider for NoopProvider {
    async fn submit(&self, _canon: &CanonicalText) -> Result<ProviderFields, ProviderError> {
        Ok(ProviderFields::default())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_fields_deserialize_partial() {
        let json = r#"{
            "required_skills": {"value": ["python", "sql"], "confidence": 0.9},
            "seniority": {"value": "mid", "confidence": 0.6}
        }"#;
        let fields: ProviderFields = serde_json::from_str(json).unwrap();
        assert_eq!(
            fields.required_skills.as_ref().unwrap().value,
            vec!["python", "sql"]
        );
        assert_eq!(fields.seniority.unwrap().value, Seniority::Mid);
        assert!(fields.remote_policy.is_none());
    }

    #[test]
    fn test_provider_fields_default_is_all_none() {
        let fields = ProviderFields::default();
        assert!(fields.required_skills.is_none());
        assert!(fields.min_experience_years.is_none());
    }

    #[tokio::test]
    async fn test_noop_provider_returns_empty_fields() {
        let canon = CanonicalText {
            normalized_text: "rust".to_string(),
            display_text: "Rust".to_string(),
            tokens: vec!["rust".to_string()],
            language_tag: "en".to_string(),
        };
        let fields = NoopProvider.submit(&canon).await.unwrap();
        assert_eq!(fields, ProviderFields::default());
    }
}
