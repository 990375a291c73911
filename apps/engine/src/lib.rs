//! Requirement Extraction & Matching Engine.
//!
//! Ingests raw job postings and a structured profile, extracts normalized
//! requirement signals, scores fit, merges near-duplicates, and emits a
//! ranked shortlist for downstream document generation.

pub mod cache;
pub mod config;
pub mod dedup;
pub mod dictionary;
pub mod errors;
pub mod extraction;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod scoring;

pub use cache::{MemoryCache, RequirementCache};
pub use config::EngineConfig;
pub use dictionary::SkillDictionary;
pub use errors::{EngineError, ExtractError, ProviderError};
pub use extraction::provider::{ExtractionProvider, NoopProvider, ProviderFields};
pub use models::posting::{CanonicalText, PostingRef, RawPosting};
pub use models::profile::Profile;
pub use models::requirement::{Education, RemotePolicy, RequirementSet, Seniority, Skill};
pub use models::shortlist::{DuplicateGroup, MatchResult, ShortlistEntry};
pub use pipeline::{BatchOutcome, CancelToken, MatchEngine, RunOptions};
