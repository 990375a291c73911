//! Matcher/Scorer — computes the fit between a requirement set and the
//! profile.
//!
//! The explanation lines are emitted in a fixed order (required match,
//! preferred match, experience, seniority, confidence dampening); the
//! downstream renderer consumes them positionally.

use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::models::profile::Profile;
use crate::models::requirement::{RequirementSet, Skill};
use crate::models::shortlist::MatchResult;

const REQUIRED_WEIGHT: f32 = 70.0;
const PREFERRED_WEIGHT: f32 = 30.0;
const EXPERIENCE_PENALTY_CAP: f32 = 10.0;

/// Scores one (requirement set, profile) pair. Pure and deterministic.
pub fn score(req: &RequirementSet, profile: &Profile, config: &EngineConfig) -> MatchResult {
    let matched_required: BTreeSet<Skill> = req
        .required_skills
        .intersection(&profile.skills)
        .cloned()
        .collect();
    let missing_required: BTreeSet<Skill> = req
        .required_skills
        .difference(&profile.skills)
        .cloned()
        .collect();
    let matched_preferred: BTreeSet<Skill> = req
        .preferred_skills
        .intersection(&profile.skills)
        .cloned()
        .collect();

    let mut explanation = Vec::with_capacity(5);

    // Absence of stated requirements is not penalized: an empty required set
    // awards the full 70-point term.
    let required_term = if req.required_skills.is_empty() {
        explanation.push(format!(
            "Required skills: none stated (+{REQUIRED_WEIGHT:.0})"
        ));
        REQUIRED_WEIGHT
    } else {
        let term = REQUIRED_WEIGHT * matched_required.len() as f32
            / req.required_skills.len() as f32;
        explanation.push(format!(
            "Required skills: matched {}/{} (+{term:.1})",
            matched_required.len(),
            req.required_skills.len()
        ));
        term
    };

    let preferred_term = PREFERRED_WEIGHT * matched_preferred.len() as f32
        / req.preferred_skills.len().max(1) as f32;
    explanation.push(format!(
        "Preferred skills: matched {}/{} (+{preferred_term:.1})",
        matched_preferred.len(),
        req.preferred_skills.len()
    ));

    let mut total = required_term + preferred_term;

    let experience_penalty = match req.min_experience_years {
        Some(min) if min > 0.0 && profile.experience_years < min => {
            let deficit = min - profile.experience_years;
            EXPERIENCE_PENALTY_CAP * (deficit / min).min(1.0)
        }
        _ => 0.0,
    };
    if experience_penalty > 0.0 {
        explanation.push(format!(
            "Experience: {:.1} years vs {:.1} required (-{experience_penalty:.1})",
            profile.experience_years,
            req.min_experience_years.unwrap_or(0.0)
        ));
    } else {
        explanation.push("Experience: meets stated requirement (-0.0)".to_string());
    }
    total = (total - experience_penalty).max(0.0);

    let seniority_penalty = match (profile.seniority.tier(), req.seniority.tier()) {
        (Some(have), Some(want)) if have < want => {
            if want - have == 1 {
                config.adjacent_tier_penalty
            } else {
                config.distant_tier_penalty
            }
        }
        _ => 0.0,
    };
    explanation.push(format!(
        "Seniority: {:?} vs {:?} required (-{seniority_penalty:.1})",
        profile.seniority, req.seniority
    ));
    total -= seniority_penalty;

    // Low-confidence extractions are dampened toward a neutral midpoint
    // rather than trusted at face value.
    let damping = config.confidence_damping;
    let factor = (1.0 - damping) + damping * req.extraction_confidence;
    explanation.push(format!(
        "Confidence dampening: x{factor:.2} (extraction confidence {:.2})",
        req.extraction_confidence
    ));
    total *= factor;

    MatchResult {
        posting_ref: req.posting_ref.clone(),
        score: total.clamp(0.0, 100.0).round() as u32,
        matched_required,
        missing_required,
        matched_preferred,
        explanation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::PostingRef;
    use crate::models::requirement::{RemotePolicy, Seniority};

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn skills(names: &[&str]) -> BTreeSet<Skill> {
        names.iter().map(|n| Skill::new(*n)).collect()
    }

    fn profile(skill_names: &[&str], years: f32, seniority: Seniority) -> Profile {
        Profile {
            skills: skills(skill_names),
            experience_years: years,
            seniority,
            education: None,
            location_prefs: BTreeSet::new(),
        }
    }

    fn req(
        required: &[&str],
        preferred: &[&str],
        min_years: Option<f32>,
        seniority: Seniority,
        confidence: f32,
    ) -> RequirementSet {
        RequirementSet {
            posting_ref: PostingRef::new(0, "p-0"),
            required_skills: skills(required),
            preferred_skills: skills(preferred),
            min_experience_years: min_years,
            seniority,
            education: None,
            remote_policy: RemotePolicy::Unknown,
            extraction_confidence: confidence,
        }
    }

    // Worked scenario: half the required skills, no preferred, enough
    // experience, seniority above requirement, full confidence → 35.
    #[test]
    fn test_reference_scenario_scores_35() {
        let requirement = req(
            &["python", "sql"],
            &["docker"],
            Some(3.0),
            Seniority::Mid,
            1.0,
        );
        let profile = profile(&["python"], 5.0, Seniority::Senior);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 35);
        assert_eq!(result.matched_required, skills(&["python"]));
        assert_eq!(result.missing_required, skills(&["sql"]));
        assert!(result.matched_preferred.is_empty());
    }

    #[test]
    fn test_empty_required_awards_full_term() {
        let requirement = req(&[], &["docker"], None, Seniority::Unknown, 1.0);
        let profile = profile(&[], 0.0, Seniority::Unknown);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 70);
    }

    #[test]
    fn test_full_match_scores_100() {
        let requirement = req(
            &["python", "sql"],
            &["docker"],
            Some(3.0),
            Seniority::Mid,
            1.0,
        );
        let profile = profile(&["python", "sql", "docker"], 5.0, Seniority::Senior);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_experience_deficit_scaled_penalty() {
        // Deficit 2 of 4 required years → 10 * 0.5 = 5 off the 70.
        let requirement = req(&[], &[], Some(4.0), Seniority::Unknown, 1.0);
        let profile = profile(&[], 2.0, Seniority::Unknown);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 65);
    }

    #[test]
    fn test_zero_experience_capped_penalty() {
        let requirement = req(&[], &[], Some(10.0), Seniority::Unknown, 1.0);
        let profile = profile(&[], 0.0, Seniority::Unknown);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 60);
    }

    #[test]
    fn test_adjacent_seniority_tier_penalty() {
        let requirement = req(&[], &[], None, Seniority::Senior, 1.0);
        let profile = profile(&[], 0.0, Seniority::Mid);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 65);
    }

    #[test]
    fn test_distant_seniority_tier_penalty() {
        let requirement = req(&[], &[], None, Seniority::Staff, 1.0);
        let profile = profile(&[], 0.0, Seniority::Junior);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 60);
    }

    #[test]
    fn test_profile_above_requirement_no_penalty() {
        let requirement = req(&[], &[], None, Seniority::Junior, 1.0);
        let profile = profile(&[], 0.0, Seniority::Staff);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 70);
    }

    #[test]
    fn test_unknown_seniority_no_penalty() {
        let requirement = req(&[], &[], None, Seniority::Staff, 1.0);
        let profile = profile(&[], 0.0, Seniority::Unknown);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 70);
    }

    #[test]
    fn test_zero_confidence_dampens_to_half() {
        let requirement = req(&[], &[], None, Seniority::Unknown, 0.0);
        let profile = profile(&[], 0.0, Seniority::Unknown);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.score, 35);
    }

    #[test]
    fn test_score_bounded_and_deterministic() {
        let requirement = req(
            &["python", "sql", "rust"],
            &["docker", "kubernetes"],
            Some(10.0),
            Seniority::Staff,
            0.3,
        );
        let profile = profile(&["python"], 1.0, Seniority::Intern);
        let a = score(&requirement, &profile, &config());
        let b = score(&requirement, &profile, &config());
        assert_eq!(a, b);
        assert!(a.score <= 100);
    }

    #[test]
    fn test_explanation_has_five_lines_in_fixed_order() {
        let requirement = req(&["python"], &["docker"], Some(3.0), Seniority::Mid, 0.8);
        let profile = profile(&["python"], 1.0, Seniority::Junior);
        let result = score(&requirement, &profile, &config());
        assert_eq!(result.explanation.len(), 5);
        assert!(result.explanation[0].starts_with("Required skills:"));
        assert!(result.explanation[1].starts_with("Preferred skills:"));
        assert!(result.explanation[2].starts_with("Experience:"));
        assert!(result.explanation[3].starts_with("Seniority:"));
        assert!(result.explanation[4].starts_with("Confidence dampening:"));
    }
}
