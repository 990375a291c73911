use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::posting::PostingRef;
use crate::models::requirement::Skill;

/// The fit between one posting's requirements and the profile. Created once
/// per (posting, profile) pair; immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub posting_ref: PostingRef,
    /// Final fit score in [0, 100], rounded to the nearest integer.
    pub score: u32,
    pub matched_required: BTreeSet<Skill>,
    pub missing_required: BTreeSet<Skill>,
    pub matched_preferred: BTreeSet<Skill>,
    /// One line per scoring term, in the fixed order: required match,
    /// preferred match, experience, seniority, confidence dampening. The
    /// downstream renderer relies on this order.
    pub explanation: Vec<String>,
}

/// A group of near-duplicate postings. Every posting in a batch belongs to
/// exactly one group; unique postings form singleton groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Member with the earliest `fetched_at`, ties broken by smallest
    /// `source_id`.
    pub representative: PostingRef,
    pub members: BTreeSet<PostingRef>,
}

impl DuplicateGroup {
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// One row of the final shortlist handed to the document renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub posting_ref: PostingRef,
    pub match_result: MatchResult,
    /// 1-based, strictly increasing with decreasing score; ties get
    /// consecutive distinct ranks.
    pub rank: u32,
}
