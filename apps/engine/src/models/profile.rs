use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::requirement::{Education, Seniority, Skill};

/// The user's structured professional profile. Supplied externally, loaded
/// once per run, and read-only to the engine for the run's duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub skills: BTreeSet<Skill>,
    pub experience_years: f32,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(default)]
    pub education: Option<Education>,
    #[serde(default)]
    pub location_prefs: BTreeSet<String>,
}

impl Profile {
    /// Basic shape validation, run before any posting is processed.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.experience_years < 0.0 {
            return Err(EngineError::InvalidProfile(format!(
                "experience_years must be non-negative, got {}",
                self.experience_years
            )));
        }
        if !self.experience_years.is_finite() {
            return Err(EngineError::InvalidProfile(
                "experience_years must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_years(years: f32) -> Profile {
        Profile {
            skills: BTreeSet::new(),
            experience_years: years,
            seniority: Seniority::Unknown,
            education: None,
            location_prefs: BTreeSet::new(),
        }
    }

    #[test]
    fn test_valid_profile_passes() {
        assert!(profile_with_years(5.0).validate().is_ok());
    }

    #[test]
    fn test_negative_experience_rejected() {
        let err = profile_with_years(-1.0).validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile(_)));
    }

    #[test]
    fn test_nan_experience_rejected() {
        assert!(profile_with_years(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_profile_deserializes_with_defaults() {
        let json = r#"{"skills": [], "experience_years": 3.0}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.seniority, Seniority::Unknown);
        assert!(profile.education.is_none());
    }
}
