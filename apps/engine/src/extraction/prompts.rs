// LLM prompt constants for the enrichment provider.

/// System prompt for requirement extraction — enforces JSON-only output.
pub const EXTRACT_SYSTEM: &str =
    "You are an expert job description analyst. \
    Extract structured requirement signals from a job posting. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Extraction prompt template. Replace `{posting_text}` before sending.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"Extract structured requirements from the following job posting.

Return a JSON object with this EXACT schema. Omit a field entirely when the
posting gives no evidence for it. Every present field carries your confidence
in it (0.0 - 1.0):
{
  "required_skills": {"value": ["python", "sql"], "confidence": 0.9},
  "preferred_skills": {"value": ["docker"], "confidence": 0.7},
  "min_experience_years": {"value": 3, "confidence": 0.8},
  "seniority": {"value": "mid", "confidence": 0.6},
  "education": {"value": "bachelor", "confidence": 0.5},
  "remote_policy": {"value": "hybrid", "confidence": 0.9}
}

Rules:

REQUIRED_SKILLS: explicit must-haves — "required", "must have", "you will need".
PREFERRED_SKILLS: nice-to-haves — "preferred", "bonus", "nice to have", "a plus".
Use lowercase canonical skill names ("postgresql" not "Postgres DB").

MIN_EXPERIENCE_YEARS: the minimum stated, as a number.

SENIORITY: one of "intern", "junior", "mid", "senior", "staff".

EDUCATION: the MINIMUM degree required, one of "high_school", "associate",
"bachelor", "master", "doctorate".

REMOTE_POLICY: one of "remote", "hybrid", "onsite".

JOB POSTING:
{posting_text}"#;
