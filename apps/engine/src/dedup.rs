//! Deduplicator — groups near-duplicate postings across sources.
//!
//! Two postings are duplicates when their normalized title and company agree
//! and the Jaccard similarity of their canonical token sets exceeds the
//! configured threshold. Duplicate relations are transitive (union-find), so
//! the produced groups partition the batch: every posting lands in exactly
//! one group, unique postings in singletons.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::models::posting::PostingRef;
use crate::models::shortlist::DuplicateGroup;

/// Per-posting inputs the deduplicator needs; built by the pipeline from the
/// raw posting and its canonical text.
#[derive(Debug, Clone)]
pub struct DedupCandidate {
    pub posting_ref: PostingRef,
    pub title: Option<String>,
    pub company: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub tokens: BTreeSet<String>,
}

/// Arena-indexed union-find: parent pointers are indices into the batch, with
/// path compression and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let root = self.find(self.parent[i]);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Groups a batch into duplicate groups. Deterministic: output is sorted by
/// representative, members by posting ref.
pub fn group_duplicates(
    candidates: &[DedupCandidate],
    config: &EngineConfig,
) -> Vec<DuplicateGroup> {
    let n = candidates.len();
    let mut uf = UnionFind::new(n);

    if n <= config.dedup_batch_ceiling {
        for i in 0..n {
            for j in (i + 1)..n {
                if is_duplicate(&candidates[i], &candidates[j], config.similarity_threshold) {
                    uf.union(i, j);
                }
            }
        }
    } else {
        // Above the ceiling: bucket by the cheap title+company fingerprint
        // first, then compare pairwise only within buckets. Postings that can
        // never satisfy the title check are skipped entirely.
        let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, c) in candidates.iter().enumerate() {
            if let Some(fp) = title_company_key(c) {
                buckets.entry(fp).or_default().push(i);
            }
        }
        for bucket in buckets.values() {
            for (a, &i) in bucket.iter().enumerate() {
                for &j in &bucket[a + 1..] {
                    if is_duplicate(&candidates[i], &candidates[j], config.similarity_threshold) {
                        uf.union(i, j);
                    }
                }
            }
        }
    }

    // Collect members per root, then pick representatives.
    let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..n {
        let root = uf.find(i);
        by_root.entry(root).or_default().push(i);
    }

    let mut groups: Vec<DuplicateGroup> = by_root
        .into_values()
        .map(|indices| {
            let representative = indices
                .iter()
                .map(|&i| &candidates[i])
                .min_by(|a, b| {
                    a.fetched_at
                        .cmp(&b.fetched_at)
                        .then_with(|| a.posting_ref.source_id.cmp(&b.posting_ref.source_id))
                })
                .map(|c| c.posting_ref.clone())
                .unwrap_or_else(|| candidates[indices[0]].posting_ref.clone());
            DuplicateGroup {
                representative,
                members: indices
                    .into_iter()
                    .map(|i| candidates[i].posting_ref.clone())
                    .collect(),
            }
        })
        .collect();

    groups.sort_by(|a, b| a.representative.cmp(&b.representative));
    groups
}

/// Duplicate predicate: equal normalized titles (both must have one), equal
/// normalized companies when both are available, and token-set Jaccard above
/// the threshold.
fn is_duplicate(a: &DedupCandidate, b: &DedupCandidate, threshold: f32) -> bool {
    let (Some(title_a), Some(title_b)) = (&a.title, &b.title) else {
        return false;
    };
    if normalize_field(title_a) != normalize_field(title_b) {
        return false;
    }
    if let (Some(ca), Some(cb)) = (&a.company, &b.company) {
        if normalize_field(ca) != normalize_field(cb) {
            return false;
        }
    }
    jaccard(&a.tokens, &b.tokens) > threshold
}

fn title_company_key(c: &DedupCandidate) -> Option<String> {
    let title = c.title.as_deref().map(normalize_field)?;
    let company = c.company.as_deref().map(normalize_field).unwrap_or_default();
    Some(format!("{title}|{company}"))
}

fn normalize_field(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f32 / union as f32
}
