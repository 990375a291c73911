//! Requirement Extractor — turns canonical text into a [`RequirementSet`].
//!
//! Two tiers: a heuristic tier that always runs (dictionary lookups, phrase
//! rules, keyword tables) and an optional enrichment tier behind the
//! [`ExtractionProvider`] trait. Enrichment failure of any kind falls back to
//! the heuristic result with a fixed confidence penalty; extraction as a
//! whole never fails once the text has normalized successfully.

pub mod anthropic;
pub mod prompts;
pub mod provider;

use std::collections::BTreeSet;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::dictionary::SkillDictionary;
use crate::models::posting::{CanonicalText, PostingRef};
use crate::models::requirement::{Education, RemotePolicy, RequirementSet, Seniority, Skill};
use crate::normalize::tokenize;
use provider::{ExtractionProvider, ProviderFields};

/// Subtracted from heuristic confidence when a configured provider fails,
/// times out, or returns malformed data.
pub const FALLBACK_CONFIDENCE_PENALTY: f32 = 0.1;

/// Number of requirement fields that participate in the confidence fraction:
/// skills, experience, seniority, education, remote policy.
const TRACKED_FIELDS: f32 = 5.0;

/// Runs both tiers. The provider (when configured) is consulted with a
/// bounded timeout and merged field-by-field; the heuristic result is the
/// floor the extraction can never fall below.
pub async fn extract(
    canon: &CanonicalText,
    dict: &SkillDictionary,
    posting_ref: PostingRef,
    provider: Option<&dyn ExtractionProvider>,
    enrichment_timeout: Duration,
    ambiguity_threshold: f32,
) -> RequirementSet {
    let mut req = extract_heuristic(canon, dict, posting_ref);

    if let Some(provider) = provider {
        match tokio::time::timeout(enrichment_timeout, provider.submit(canon)).await {
            Ok(Ok(fields)) => {
                debug!("Enrichment merged from provider '{}'", provider.name());
                req = merge_enrichment(req, &fields, dict);
            }
            Ok(Err(e)) => {
                warn!(
                    "Enrichment provider '{}' failed, falling back to heuristics: {e}",
                    provider.name()
                );
                req.extraction_confidence =
                    (req.extraction_confidence - FALLBACK_CONFIDENCE_PENALTY).max(0.0);
            }
            Err(_) => {
                warn!(
                    "Enrichment provider '{}' timed out after {:?}, falling back to heuristics",
                    provider.name(),
                    enrichment_timeout
                );
                req.extraction_confidence =
                    (req.extraction_confidence - FALLBACK_CONFIDENCE_PENALTY).max(0.0);
            }
        }
    }

    enforce_disjoint(&mut req, ambiguity_threshold);
    req
}

/// Heuristic tier. Pure function of the canonical text and the dictionary;
/// identical inputs yield bit-identical output (ordered sets throughout, no
/// unordered iteration feeds a decision).
pub fn extract_heuristic(
    canon: &CanonicalText,
    dict: &SkillDictionary,
    posting_ref: PostingRef,
) -> RequirementSet {
    let (required_skills, preferred_skills) = scan_skills(&canon.normalized_text, dict);

    let mut req = RequirementSet {
        posting_ref,
        required_skills,
        preferred_skills,
        min_experience_years: extract_min_years(&canon.normalized_text),
        seniority: extract_seniority(&canon.tokens),
        education: extract_education(&canon.tokens),
        remote_policy: extract_remote_policy(&canon.tokens),
        extraction_confidence: 0.0,
    };
    req.extraction_confidence = compute_confidence(&req);
    req
}

#[derive(Clone, Copy, PartialEq)]
enum SkillMode {
    Required,
    Preferred,
}

/// Walks sentence segments, classifying each as required or preferred
/// context and resolving dictionary n-grams within it. A segment with a
/// preferred marker ("preferred", "nice to have", "a plus") contributes to
/// `preferred_skills`; a required marker resets to required; an unmarked
/// segment inherits the mode of the previous one.
fn scan_skills(
    normalized_text: &str,
    dict: &SkillDictionary,
) -> (BTreeSet<Skill>, BTreeSet<Skill>) {
    let mut required = BTreeSet::new();
    let mut preferred = BTreeSet::new();
    let mut mode = SkillMode::Required;

    for segment in split_segments(normalized_text) {
        let tokens = tokenize(segment, dict);
        if tokens.is_empty() {
            continue;
        }

        if has_preferred_marker(&tokens) {
            mode = SkillMode::Preferred;
        } else if has_required_marker(&tokens) {
            mode = SkillMode::Required;
        }

        let target = match mode {
            SkillMode::Required => &mut required,
            SkillMode::Preferred => &mut preferred,
        };

        // Longest-match n-gram scan against the dictionary.
        let max_n = dict.max_alias_words();
        let mut i = 0;
        while i < tokens.len() {
            let mut advanced = false;
            for n in (1..=max_n.min(tokens.len() - i)).rev() {
                let phrase = tokens[i..i + n].join(" ");
                if let Some(skill) = dict.resolve(&phrase) {
                    target.insert(skill.clone());
                    i += n;
                    advanced = true;
                    break;
                }
            }
            if !advanced {
                i += 1;
            }
        }
    }

    (required, preferred)
}

/// Sentence segmentation that does not tear dotted skill names apart: ';',
/// '!', '?' always end a segment, '.' only when followed by whitespace or
/// end-of-text ("node.js" stays whole).
fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    for (i, c) in text.char_indices() {
        let boundary = match c {
            ';' | '!' | '?' => true,
            '.' => bytes
                .get(i + 1)
                .map(|&b| (b as char).is_whitespace())
                .unwrap_or(true),
            _ => false,
        };
        if boundary {
            if start < i {
                segments.push(&text[start..i]);
            }
            start = i + 1;
        }
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

fn has_preferred_marker(tokens: &[String]) -> bool {
    tokens.iter().any(|t| {
        matches!(
            t.as_str(),
            "preferred" | "bonus" | "plus" | "nice-to-have" | "desirable"
        )
    }) || has_phrase(tokens, &["nice", "to", "have"])
}

fn has_required_marker(tokens: &[String]) -> bool {
    tokens.iter().any(|t| {
        matches!(
            t.as_str(),
            "required" | "requirements" | "must" | "must-have" | "qualifications"
        )
    })
}

fn has_phrase(tokens: &[String], phrase: &[&str]) -> bool {
    tokens
        .windows(phrase.len())
        .any(|w| w.iter().zip(phrase).all(|(t, p)| t == p))
}

fn years_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b").expect("valid years pattern")
    })
}

/// Matches "5+ years", "5 years", and therefore also the tail of "minimum of
/// 3 years" / "at least 3 years". When a posting states several figures the
/// largest is taken as the strictest stated requirement.
fn extract_min_years(normalized_text: &str) -> Option<f32> {
    years_pattern()
        .captures_iter(normalized_text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .filter(|&y| y <= 50)
        .max()
        .map(|y| y as f32)
}

/// Highest ladder position mentioned wins: a "Senior" title outranks a stray
/// "junior" elsewhere in the body.
fn extract_seniority(tokens: &[String]) -> Seniority {
    let has = |t: &str| tokens.iter().any(|tok| tok == t);

    if has("staff") || has("principal") {
        Seniority::Staff
    } else if has("senior") || has("sr") {
        Seniority::Senior
    } else if has("mid-level") || has("intermediate") || has_phrase(tokens, &["mid", "level"]) {
        Seniority::Mid
    } else if has("junior")
        || has("jr")
        || has("entry-level")
        || has_phrase(tokens, &["entry", "level"])
    {
        Seniority::Junior
    } else if has("intern") || has("internship") {
        Seniority::Intern
    } else {
        Seniority::Unknown
    }
}

/// "hybrid" beats "remote" beats onsite markers: hybrid postings routinely
/// mention remote days, and onsite is the weakest signal.
fn extract_remote_policy(tokens: &[String]) -> RemotePolicy {
    let has = |t: &str| tokens.iter().any(|tok| tok == t);

    if has("hybrid") {
        RemotePolicy::Hybrid
    } else if has("remote") {
        RemotePolicy::Remote
    } else if has("onsite")
        || has("on-site")
        || has("in-office")
        || has_phrase(tokens, &["on", "site"])
        || has_phrase(tokens, &["in", "office"])
    {
        RemotePolicy::Onsite
    } else {
        RemotePolicy::Unknown
    }
}

/// The lowest degree mentioned is taken as the minimum requirement
/// ("Bachelor's required, Master's preferred" requires a bachelor's).
fn extract_education(tokens: &[String]) -> Option<Education> {
    let has = |t: &str| tokens.iter().any(|tok| tok == t);

    let mut mentioned = Vec::new();
    if has_phrase(tokens, &["high", "school"]) {
        mentioned.push(Education::HighSchool);
    }
    if has("associate") || has("associate's") {
        mentioned.push(Education::Associate);
    }
    if has("bachelor") || has("bachelor's") || has("bachelors") || has("bsc") {
        mentioned.push(Education::Bachelor);
    }
    if has("master") || has("master's") || has("masters") || has("msc") {
        mentioned.push(Education::Master);
    }
    if has("phd") || has("ph.d") || has("doctorate") || has("doctoral") {
        mentioned.push(Education::Doctorate);
    }
    mentioned.into_iter().min()
}

/// Fraction of tracked fields the extraction managed to populate.
fn compute_confidence(req: &RequirementSet) -> f32 {
    let populated = [
        !req.required_skills.is_empty() || !req.preferred_skills.is_empty(),
        req.min_experience_years.is_some(),
        req.seniority != Seniority::Unknown,
        req.education.is_some(),
        req.remote_policy != RemotePolicy::Unknown,
    ]
    .iter()
    .filter(|&&populated| populated)
    .count();
    populated as f32 / TRACKED_FIELDS
}

/// Field-level precedence merge: a provider field overrides the heuristic
/// value only when its confidence exceeds the heuristic tier's overall
/// confidence. Overall confidence is then recomputed over the merged set.
pub fn merge_enrichment(
    mut req: RequirementSet,
    fields: &ProviderFields,
    dict: &SkillDictionary,
) -> RequirementSet {
    let heuristic_confidence = req.extraction_confidence;
    let wins = |confidence: f32| confidence > heuristic_confidence;

    if let Some(f) = &fields.required_skills {
        if wins(f.confidence) {
            req.required_skills = canonicalize_skills(&f.value, dict);
        }
    }
    if let Some(f) = &fields.preferred_skills {
        if wins(f.confidence) {
            req.preferred_skills = canonicalize_skills(&f.value, dict);
        }
    }
    if let Some(f) = &fields.min_experience_years {
        if wins(f.confidence) {
            req.min_experience_years = Some(f.value);
        }
    }
    if let Some(f) = &fields.seniority {
        if wins(f.confidence) {
            req.seniority = f.value;
        }
    }
    if let Some(f) = &fields.education {
        if wins(f.confidence) {
            req.education = Some(f.value);
        }
    }
    if let Some(f) = &fields.remote_policy {
        if wins(f.confidence) {
            req.remote_policy = f.value;
        }
    }

    req.extraction_confidence = compute_confidence(&req);
    req
}

/// Provider skill names go through the dictionary; names outside it are kept
/// as-is (lowercased) rather than dropped.
fn canonicalize_skills(names: &[String], dict: &SkillDictionary) -> BTreeSet<Skill> {
    names
        .iter()
        .map(|name| {
            let lower = name.to_lowercase();
            dict.resolve(&lower)
                .cloned()
                .unwrap_or_else(|| Skill::new(lower))
        })
        .collect()
}

/// Required/preferred overlap is only tolerated below the ambiguity
/// threshold; at or above it, required wins and the overlap is removed from
/// preferred.
fn enforce_disjoint(req: &mut RequirementSet, ambiguity_threshold: f32) {
    if req.extraction_confidence >= ambiguity_threshold {
        let overlap: Vec<Skill> = req
            .preferred_skills
            .intersection(&req.required_skills)
            .cloned()
            .collect();
        for skill in overlap {
            req.preferred_skills.remove(&skill);
        }
    }
}
