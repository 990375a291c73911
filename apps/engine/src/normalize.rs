//! Normalizer — turns raw posting text into [`CanonicalText`].
//!
//! Pure function of its input plus the dictionary's protected-token list.

use crate::dictionary::SkillDictionary;
use crate::errors::ExtractError;
use crate::models::posting::CanonicalText;

/// Cleans and tokenizes raw posting text.
///
/// Strips markup, collapses whitespace, lowercases for matching while keeping
/// an original-case display copy, and tokenizes on word boundaries. Tokens on
/// the dictionary's protected list ("c++", "node.js") survive punctuation
/// stripping whole.
pub fn normalize(raw_text: &str, dict: &SkillDictionary) -> Result<CanonicalText, ExtractError> {
    let stripped = strip_markup(raw_text);
    let display_text = collapse_whitespace(&stripped);
    if display_text.is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let normalized_text = display_text.to_lowercase();
    let tokens = tokenize(&normalized_text, dict);

    Ok(CanonicalText {
        normalized_text,
        display_text,
        tokens,
        language_tag: "en".to_string(),
    })
}

/// Removes HTML-ish tags and decodes the handful of entities that show up in
/// scraped postings. Tag contents are replaced with a space so that
/// `foo</li><li>bar` does not fuse into one word.
fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => {
                in_tag = true;
                out.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits on whitespace and strips punctuation from token edges, except that
/// protected tokens keep their skill-relevant punctuation. Also used by the
/// extractor to re-tokenize individual sentence segments.
pub(crate) fn tokenize(normalized_text: &str, dict: &SkillDictionary) -> Vec<String> {
    normalized_text
        .split_whitespace()
        .filter_map(|chunk| clean_token(chunk, dict))
        .collect()
}

fn clean_token(chunk: &str, dict: &SkillDictionary) -> Option<String> {
    // First pass: shed sentence punctuation that never belongs to a skill
    // name, then check the protected list before touching anything else.
    let trimmed = chunk.trim_matches(|c: char| {
        matches!(c, ',' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | '*' | '•')
    });
    if dict.is_protected(trimmed) {
        return Some(trimmed.to_string());
    }

    // Second pass: shed the skill-ish edge punctuation too ("node.js." loses
    // only the trailing dot; ".net" was already caught above).
    let trimmed = trimmed.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> SkillDictionary {
        SkillDictionary::default()
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert_eq!(normalize("", &dict()).unwrap_err(), ExtractError::EmptyInput);
        assert_eq!(
            normalize("   \n\t  ", &dict()).unwrap_err(),
            ExtractError::EmptyInput
        );
    }

    #[test]
    fn test_markup_only_input_is_an_error() {
        assert_eq!(
            normalize("<div><br/></div>", &dict()).unwrap_err(),
            ExtractError::EmptyInput
        );
    }

    #[test]
    fn test_display_text_preserves_case() {
        let canon = normalize("Senior Rust Engineer", &dict()).unwrap();
        assert_eq!(canon.display_text, "Senior Rust Engineer");
        assert_eq!(canon.normalized_text, "senior rust engineer");
    }

    #[test]
    fn test_html_tags_stripped_and_whitespace_collapsed() {
        let canon = normalize("<ul><li>Rust</li><li>Go</li></ul>", &dict()).unwrap();
        assert_eq!(canon.normalized_text, "rust go");
    }

    #[test]
    fn test_entities_decoded() {
        let canon = normalize("C &amp; C++", &dict()).unwrap();
        assert_eq!(canon.display_text, "C & C++");
    }

    #[test]
    fn test_protected_tokens_survive() {
        let canon = normalize("Experience with C++, Node.js, and .NET required.", &dict()).unwrap();
        assert!(canon.tokens.contains(&"c++".to_string()));
        assert!(canon.tokens.contains(&"node.js".to_string()));
        assert!(canon.tokens.contains(&".net".to_string()));
    }

    #[test]
    fn test_ordinary_punctuation_stripped() {
        let canon = normalize("Skills: Python, (SQL), \"Docker\"!", &dict()).unwrap();
        assert_eq!(canon.tokens, vec!["skills", "python", "sql", "docker"]);
    }

    #[test]
    fn test_trailing_dot_stripped_from_unprotected_token() {
        let canon = normalize("We ship fast.", &dict()).unwrap();
        assert_eq!(canon.tokens, vec!["we", "ship", "fast"]);
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let d = dict();
        let text = "Senior Engineer — Rust, C++, Kubernetes. 5+ years.";
        let a = normalize(text, &d).unwrap();
        let b = normalize(text, &d).unwrap();
        assert_eq!(a, b);
    }
}
