use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::models::posting::PostingRef;

/// Seniority ladder. `Unknown` means the posting (or profile) did not state
/// one; it never triggers a mismatch penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Staff,
    #[default]
    Unknown,
}

impl Seniority {
    /// Position on the ladder, `None` for `Unknown`.
    pub fn tier(self) -> Option<u8> {
        match self {
            Seniority::Intern => Some(0),
            Seniority::Junior => Some(1),
            Seniority::Mid => Some(2),
            Seniority::Senior => Some(3),
            Seniority::Staff => Some(4),
            Seniority::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemotePolicy {
    Remote,
    Hybrid,
    Onsite,
    #[default]
    Unknown,
}

/// A canonicalized skill. Equality, ordering, and hashing are by
/// `canonical_name` only — aliases are carried for display and never
/// participate in identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Skill {
    pub canonical_name: String,
    pub aliases: BTreeSet<String>,
}

impl Skill {
    pub fn new(canonical_name: impl Into<String>) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            aliases: BTreeSet::new(),
        }
    }

    pub fn with_aliases<I, S>(canonical_name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical_name: canonical_name.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

impl PartialEq for Skill {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name == other.canonical_name
    }
}

impl Eq for Skill {}

impl PartialOrd for Skill {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Skill {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_name.cmp(&other.canonical_name)
    }
}

impl Hash for Skill {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_name.hash(state);
    }
}

/// Structured requirement signals extracted from one posting.
///
/// Invariant: `required_skills` and `preferred_skills` are disjoint unless
/// `extraction_confidence` fell below the configured ambiguity threshold
/// (conflicting evidence is preserved rather than guessed away).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementSet {
    pub posting_ref: PostingRef,
    pub required_skills: BTreeSet<Skill>,
    pub preferred_skills: BTreeSet<Skill>,
    pub min_experience_years: Option<f32>,
    pub seniority: Seniority,
    pub education: Option<Education>,
    pub remote_policy: RemotePolicy,
    /// In [0, 1]. Fraction of fields the extractor managed to populate,
    /// minus the fallback penalty if the enrichment provider failed.
    pub extraction_confidence: f32,
}

impl RequirementSet {
    /// An empty requirement set for the given posting, all fields unknown.
    pub fn empty(posting_ref: PostingRef) -> Self {
        Self {
            posting_ref,
            required_skills: BTreeSet::new(),
            preferred_skills: BTreeSet::new(),
            min_experience_years: None,
            seniority: Seniority::Unknown,
            education: None,
            remote_policy: RemotePolicy::Unknown,
            extraction_confidence: 0.0,
        }
    }

    /// Rebinds the set to a different posting, e.g. after a cache hit from a
    /// previous run where the batch index differed.
    pub fn rebind(mut self, posting_ref: PostingRef) -> Self {
        self.posting_ref = posting_ref;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_equality_ignores_aliases() {
        let a = Skill::with_aliases("postgresql", ["postgres", "psql"]);
        let b = Skill::new("postgresql");
        assert_eq!(a, b);
    }

    #[test]
    fn test_skill_set_dedups_by_canonical_name() {
        let mut set = BTreeSet::new();
        set.insert(Skill::with_aliases("rust", ["rustlang"]));
        set.insert(Skill::new("rust"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_seniority_tier_order() {
        assert!(Seniority::Senior.tier() > Seniority::Mid.tier());
        assert_eq!(Seniority::Unknown.tier(), None);
    }

    #[test]
    fn test_seniority_serde_snake_case() {
        let s: Seniority = serde_json::from_str(r#""senior""#).unwrap();
        assert_eq!(s, Seniority::Senior);
    }

    #[test]
    fn test_rebind_updates_posting_ref_only() {
        let req = RequirementSet::empty(PostingRef::new(0, "a"));
        let rebound = req.clone().rebind(PostingRef::new(7, "b"));
        assert_eq!(rebound.posting_ref.index, 7);
        assert_eq!(rebound.required_skills, req.required_skills);
    }
}
