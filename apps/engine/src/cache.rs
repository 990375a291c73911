//! Optional requirement cache — a narrow get/put collaborator keyed by a
//! posting fingerprint. Its absence degrades performance only, never
//! correctness.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::posting::RawPosting;
use crate::models::requirement::RequirementSet;

/// Number of leading canonical tokens used for the fingerprint when a posting
/// carries no title.
const FALLBACK_TOKEN_COUNT: usize = 12;

/// Cache contract. The engine consults it before extraction for a given
/// fingerprint and populates it afterwards.
#[async_trait]
pub trait RequirementCache: Send + Sync {
    async fn get(&self, fingerprint: &str) -> Option<RequirementSet>;
    async fn put(&self, fingerprint: &str, req: &RequirementSet);
}

/// Cache key for a posting: normalized `title|company`, falling back to the
/// first canonical tokens when the scanner supplied no title.
pub fn posting_fingerprint(posting: &RawPosting, tokens: &[String]) -> String {
    match &posting.title {
        Some(title) => {
            let company = posting.company.as_deref().unwrap_or("");
            format!(
                "{}|{}",
                normalize_key(title),
                normalize_key(company)
            )
        }
        None => tokens
            .iter()
            .take(FALLBACK_TOKEN_COUNT)
            .cloned()
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// In-memory cache, useful within a process lifetime and in tests.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, RequirementSet>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequirementCache for MemoryCache {
    async fn get(&self, fingerprint: &str) -> Option<RequirementSet> {
        self.entries.read().await.get(fingerprint).cloned()
    }

    async fn put(&self, fingerprint: &str, req: &RequirementSet) {
        self.entries
            .write()
            .await
            .insert(fingerprint.to_string(), req.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::PostingRef;
    use chrono::Utc;

    fn posting(title: Option<&str>, company: Option<&str>) -> RawPosting {
        RawPosting {
            source_id: "s1".to_string(),
            source_name: "board".to_string(),
            url: "https://example.test/1".to_string(),
            title: title.map(String::from),
            company: company.map(String::from),
            fetched_at: Utc::now(),
            raw_text: "text".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_from_title_and_company() {
        let fp = posting_fingerprint(&posting(Some("Rust  Engineer"), Some("Acme Corp")), &[]);
        assert_eq!(fp, "rust engineer|acme corp");
    }

    #[test]
    fn test_fingerprint_without_company() {
        let fp = posting_fingerprint(&posting(Some("Rust Engineer"), None), &[]);
        assert_eq!(fp, "rust engineer|");
    }

    #[test]
    fn test_fingerprint_falls_back_to_tokens() {
        let tokens: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
        let fp = posting_fingerprint(&posting(None, None), &tokens);
        assert_eq!(fp.split(' ').count(), FALLBACK_TOKEN_COUNT);
        assert!(fp.starts_with("t0 t1"));
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryCache::new();
        let req = RequirementSet::empty(PostingRef::new(0, "s1"));
        assert!(cache.get("key").await.is_none());
        cache.put("key", &req).await;
        assert_eq!(cache.get("key").await, Some(req));
    }
}
