//! Batch pipeline — orchestrates normalize → extract → score → dedup → rank.
//!
//! Per-posting work (normalization, extraction with optional enrichment,
//! scoring) runs concurrently in tokio tasks bounded by a semaphore; postings
//! are independent and share only read-only state. Deduplication and ranking
//! need the whole batch and run after every task has completed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::{posting_fingerprint, RequirementCache};
use crate::config::EngineConfig;
use crate::dedup::{group_duplicates, DedupCandidate};
use crate::dictionary::SkillDictionary;
use crate::errors::{EngineError, ExtractError};
use crate::extraction::{extract, provider::ExtractionProvider};
use crate::models::posting::{PostingRef, RawPosting};
use crate::models::profile::Profile;
use crate::models::requirement::RequirementSet;
use crate::models::shortlist::{DuplicateGroup, MatchResult, ShortlistEntry};
use crate::normalize::normalize;
use crate::rank::rank;
use crate::scoring::score;

/// Cooperative cancellation handle for a batch run. Cloneable; cancelling any
/// clone cancels the run.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

#[derive(Default)]
struct CancelInner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Per-run options. The default runs to completion with no cancellation
/// handle and discards everything if one fires.
#[derive(Clone, Default)]
pub struct RunOptions {
    pub cancel: Option<CancelToken>,
    /// When set, a cancelled run returns the postings already processed
    /// (marked `partial`) instead of `EngineError::BatchCancelled`.
    pub allow_partial: bool,
}

/// A posting skipped for a per-posting error; never aborts the batch.
#[derive(Debug, Clone)]
pub struct SkippedPosting {
    pub posting_ref: PostingRef,
    pub error: ExtractError,
}

/// Everything the engine hands downstream for one batch.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub shortlist: Vec<ShortlistEntry>,
    pub groups: Vec<DuplicateGroup>,
    pub skipped: Vec<SkippedPosting>,
    /// True when the run was cancelled but partial tolerance was requested.
    pub partial: bool,
}

struct ProcessedPosting {
    posting_ref: PostingRef,
    title: Option<String>,
    company: Option<String>,
    fetched_at: chrono::DateTime<chrono::Utc>,
    tokens: Vec<String>,
    requirement: RequirementSet,
    match_result: MatchResult,
}

/// The Requirement Extraction & Matching Engine.
///
/// Construction validates the configuration; the dictionary, provider, and
/// cache are fixed for the engine's lifetime and shared read-only across a
/// run's tasks.
pub struct MatchEngine {
    config: EngineConfig,
    dictionary: Arc<SkillDictionary>,
    provider: Option<Arc<dyn ExtractionProvider>>,
    cache: Option<Arc<dyn RequirementCache>>,
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("config", &self.config)
            .field("provider", &self.provider.as_ref().map(|_| "dyn ExtractionProvider"))
            .field("cache", &self.cache.as_ref().map(|_| "dyn RequirementCache"))
            .finish_non_exhaustive()
    }
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            dictionary: Arc::new(SkillDictionary::default()),
            provider: None,
            cache: None,
        })
    }

    pub fn with_dictionary(mut self, dictionary: SkillDictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ExtractionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn RequirementCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Runs a batch to completion with default options.
    pub async fn run_batch(
        &self,
        postings: &[RawPosting],
        profile: &Profile,
    ) -> Result<BatchOutcome, EngineError> {
        self.run_batch_with(postings, profile, RunOptions::default())
            .await
    }

    /// Runs a batch with explicit cancellation/partial-tolerance options.
    pub async fn run_batch_with(
        &self,
        postings: &[RawPosting],
        profile: &Profile,
        options: RunOptions,
    ) -> Result<BatchOutcome, EngineError> {
        profile.validate()?;

        let run_id = Uuid::new_v4();
        info!(%run_id, postings = postings.len(), "Starting batch run");

        let profile = Arc::new(profile.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));
        let mut tasks: JoinSet<Result<ProcessedPosting, SkippedPosting>> = JoinSet::new();

        for (index, posting) in postings.iter().enumerate() {
            let posting = posting.clone();
            let profile = Arc::clone(&profile);
            let dictionary = Arc::clone(&self.dictionary);
            let provider = self.provider.clone();
            let cache = self.cache.clone();
            let config = self.config.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                process_posting(index, posting, profile, dictionary, provider, cache, config)
                    .await
            });
        }

        let cancel = options.cancel.clone();
        let mut processed = Vec::new();
        let mut skipped = Vec::new();
        let mut cancelled = false;

        while !tasks.is_empty() {
            tokio::select! {
                // Check cancellation before draining completions so a
                // pre-cancelled token cannot lose the race against a fast
                // task.
                biased;
                _ = wait_cancelled(&cancel), if cancel.is_some() && !cancelled => {
                    warn!(%run_id, "Batch cancelled; aborting in-flight tasks");
                    cancelled = true;
                    tasks.abort_all();
                }
                joined = tasks.join_next() => {
                    match joined {
                        Some(Ok(Ok(p))) => processed.push(p),
                        Some(Ok(Err(skip))) => {
                            warn!(
                                %run_id,
                                source_id = %skip.posting_ref.source_id,
                                "Skipping posting: {}",
                                skip.error
                            );
                            skipped.push(skip);
                        }
                        Some(Err(e)) if e.is_cancelled() => {}
                        Some(Err(e)) => {
                            return Err(EngineError::Internal(anyhow::anyhow!(
                                "posting task failed: {e}"
                            )));
                        }
                        None => break,
                    }
                }
            }
        }

        if cancelled && !options.allow_partial {
            return Err(EngineError::BatchCancelled);
        }

        // Task completion order is nondeterministic; restore batch order
        // before the deterministic stages.
        processed.sort_by_key(|p| p.posting_ref.index);

        let candidates: Vec<DedupCandidate> = processed
            .iter()
            .map(|p| DedupCandidate {
                posting_ref: p.posting_ref.clone(),
                title: p.title.clone(),
                company: p.company.clone(),
                fetched_at: p.fetched_at,
                tokens: p.tokens.iter().cloned().collect(),
            })
            .collect();
        let groups = group_duplicates(&candidates, &self.config);

        let confidences: HashMap<usize, f32> = processed
            .iter()
            .map(|p| (p.posting_ref.index, p.requirement.extraction_confidence))
            .collect();
        let matches = processed.into_iter().map(|p| p.match_result).collect();
        let shortlist = rank(matches, &confidences, &groups);

        info!(
            %run_id,
            shortlisted = shortlist.len(),
            groups = groups.len(),
            skipped = skipped.len(),
            "Batch run complete"
        );

        Ok(BatchOutcome {
            shortlist,
            groups,
            skipped,
            partial: cancelled,
        })
    }
}

async fn wait_cancelled(cancel: &Option<CancelToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn process_posting(
    index: usize,
    posting: RawPosting,
    profile: Arc<Profile>,
    dictionary: Arc<SkillDictionary>,
    provider: Option<Arc<dyn ExtractionProvider>>,
    cache: Option<Arc<dyn RequirementCache>>,
    config: EngineConfig,
) -> Result<ProcessedPosting, SkippedPosting> {
    let posting_ref = PostingRef::new(index, posting.source_id.clone());

    let canon = normalize(&posting.raw_text, &dictionary).map_err(|error| SkippedPosting {
        posting_ref: posting_ref.clone(),
        error,
    })?;

    let fingerprint = posting_fingerprint(&posting, &canon.tokens);

    let requirement = match lookup_cached(&cache, &fingerprint).await {
        Some(cached) => cached.rebind(posting_ref.clone()),
        None => {
            let requirement = extract(
                &canon,
                &dictionary,
                posting_ref.clone(),
                provider.as_deref(),
                config.enrichment_timeout,
                config.ambiguity_threshold,
            )
            .await;
            if let Some(cache) = &cache {
                cache.put(&fingerprint, &requirement).await;
            }
            requirement
        }
    };

    let match_result = score(&requirement, &profile, &config);

    Ok(ProcessedPosting {
        posting_ref,
        title: posting.title,
        company: posting.company,
        fetched_at: posting.fetched_at,
        tokens: canon.tokens,
        requirement,
        match_result,
    })
}

async fn lookup_cached(
    cache: &Option<Arc<dyn RequirementCache>>,
    fingerprint: &str,
) -> Option<RequirementSet> {
    match cache {
        Some(cache) => cache.get(fingerprint).await,
        None => None,
    }
}
