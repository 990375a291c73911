//! Ranker — orders scored, deduplicated postings into the shortlist.
//!
//! Only group representatives are eligible; non-representative duplicates
//! stay in their [`DuplicateGroup`] for traceability but never reach the
//! shortlist. The sort key (score desc, extraction confidence desc, source_id
//! asc) is a total order, so the output is deterministic.

use std::collections::{HashMap, HashSet};

use crate::models::shortlist::{DuplicateGroup, MatchResult, ShortlistEntry};

/// Ranks match results against the duplicate groups. Ranks are assigned
/// post-sort starting at 1 with no gaps; ties get consecutive distinct ranks.
pub fn rank(
    matches: Vec<MatchResult>,
    confidences: &HashMap<usize, f32>,
    groups: &[DuplicateGroup],
) -> Vec<ShortlistEntry> {
    let representatives: HashSet<usize> =
        groups.iter().map(|g| g.representative.index).collect();

    let mut eligible: Vec<MatchResult> = matches
        .into_iter()
        .filter(|m| representatives.contains(&m.posting_ref.index))
        .collect();

    eligible.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| {
                let ca = confidences.get(&a.posting_ref.index).copied().unwrap_or(0.0);
                let cb = confidences.get(&b.posting_ref.index).copied().unwrap_or(0.0);
                cb.partial_cmp(&ca).unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.posting_ref.source_id.cmp(&b.posting_ref.source_id))
    });

    eligible
        .into_iter()
        .enumerate()
        .map(|(i, match_result)| ShortlistEntry {
            posting_ref: match_result.posting_ref.clone(),
            match_result,
            rank: (i + 1) as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::PostingRef;
    use std::collections::BTreeSet;

    fn match_result(index: usize, source_id: &str, score: u32) -> MatchResult {
        MatchResult {
            posting_ref: PostingRef::new(index, source_id),
            score,
            matched_required: BTreeSet::new(),
            missing_required: BTreeSet::new(),
            matched_preferred: BTreeSet::new(),
            explanation: vec![],
        }
    }

    fn singleton_groups(refs: &[(usize, &str)]) -> Vec<DuplicateGroup> {
        refs.iter()
            .map(|(i, s)| DuplicateGroup {
                representative: PostingRef::new(*i, *s),
                members: std::iter::once(PostingRef::new(*i, *s)).collect(),
            })
            .collect()
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let groups = singleton_groups(&[(0, "a"), (1, "b"), (2, "c")]);
        let confidences = HashMap::from([(0, 0.5), (1, 0.5), (2, 0.5)]);
        let matches = vec![
            match_result(0, "a", 40),
            match_result(1, "b", 90),
            match_result(2, "c", 60),
        ];
        let shortlist = rank(matches, &confidences, &groups);
        let scores: Vec<u32> = shortlist.iter().map(|e| e.match_result.score).collect();
        assert_eq!(scores, vec![90, 60, 40]);
    }

    #[test]
    fn test_ranks_are_consecutive_from_one_even_across_ties() {
        let groups = singleton_groups(&[(0, "a"), (1, "b"), (2, "c")]);
        let confidences = HashMap::from([(0, 0.5), (1, 0.5), (2, 0.5)]);
        let matches = vec![
            match_result(0, "a", 50),
            match_result(1, "b", 50),
            match_result(2, "c", 50),
        ];
        let shortlist = rank(matches, &confidences, &groups);
        let ranks: Vec<u32> = shortlist.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_score_tie_broken_by_confidence_then_source_id() {
        let groups = singleton_groups(&[(0, "zzz"), (1, "aaa"), (2, "mmm")]);
        let confidences = HashMap::from([(0, 0.9), (1, 0.4), (2, 0.4)]);
        let matches = vec![
            match_result(0, "zzz", 50),
            match_result(1, "aaa", 50),
            match_result(2, "mmm", 50),
        ];
        let shortlist = rank(matches, &confidences, &groups);
        let order: Vec<&str> = shortlist
            .iter()
            .map(|e| e.posting_ref.source_id.as_str())
            .collect();
        // Highest confidence first, then source_id ascending.
        assert_eq!(order, vec!["zzz", "aaa", "mmm"]);
    }

    #[test]
    fn test_non_representatives_dropped() {
        let groups = vec![DuplicateGroup {
            representative: PostingRef::new(0, "a"),
            members: [PostingRef::new(0, "a"), PostingRef::new(1, "b")]
                .into_iter()
                .collect(),
        }];
        let confidences = HashMap::from([(0, 0.5), (1, 0.5)]);
        let matches = vec![match_result(0, "a", 40), match_result(1, "b", 95)];
        let shortlist = rank(matches, &confidences, &groups);
        assert_eq!(shortlist.len(), 1);
        assert_eq!(shortlist[0].posting_ref.source_id, "a");
    }

    #[test]
    fn test_sort_key_reproduces_rank_order() {
        let groups = singleton_groups(&[(0, "d"), (1, "c"), (2, "b"), (3, "a")]);
        let confidences = HashMap::from([(0, 0.2), (1, 0.8), (2, 0.8), (3, 0.1)]);
        let matches = vec![
            match_result(0, "d", 70),
            match_result(1, "c", 70),
            match_result(2, "b", 70),
            match_result(3, "a", 90),
        ];
        let shortlist = rank(matches, &confidences, &groups);
        let mut resorted = shortlist.clone();
        resorted.sort_by(|x, y| x.rank.cmp(&y.rank));
        assert_eq!(resorted, shortlist);
        assert_eq!(shortlist[0].posting_ref.source_id, "a");
        // 70-score group: confidence 0.8 pair ordered b before c by source_id.
        assert_eq!(shortlist[1].posting_ref.source_id, "b");
        assert_eq!(shortlist[2].posting_ref.source_id, "c");
        assert_eq!(shortlist[3].posting_ref.source_id, "d");
    }

    #[test]
    fn test_empty_matches_empty_shortlist() {
        let shortlist = rank(vec![], &HashMap::new(), &[]);
        assert!(shortlist.is_empty());
    }
}
