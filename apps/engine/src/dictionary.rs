//! Skill canonicalization — an explicit immutable lookup table loaded once
//! before a batch and shared read-only across extraction tasks.

use std::collections::{BTreeSet, HashMap};

use crate::models::requirement::Skill;

/// Immutable mapping from skill aliases to canonical skills, plus the
/// protected-token list consulted by the normalizer.
///
/// All lookups are lowercase. Multi-word aliases ("machine learning") are
/// supported; [`SkillDictionary::max_alias_words`] bounds the n-gram window
/// the extractor needs to scan.
#[derive(Debug)]
pub struct SkillDictionary {
    skills: Vec<Skill>,
    by_alias: HashMap<String, usize>,
    protected_tokens: BTreeSet<String>,
    max_alias_words: usize,
}

impl SkillDictionary {
    /// Builds a dictionary from (canonical name, aliases) entries and a
    /// protected-token list. The canonical name itself is always an alias.
    pub fn new<I, S, A>(entries: I, protected_tokens: A) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
        A: IntoIterator<Item = S>,
    {
        let mut skills = Vec::new();
        let mut by_alias = HashMap::new();
        let mut max_alias_words = 1;

        for (canonical, aliases) in entries {
            let canonical: String = canonical.into().to_lowercase();
            let aliases: BTreeSet<String> =
                aliases.into_iter().map(|a| a.into().to_lowercase()).collect();
            let index = skills.len();

            by_alias.insert(canonical.clone(), index);
            max_alias_words = max_alias_words.max(canonical.split_whitespace().count());
            for alias in &aliases {
                by_alias.insert(alias.clone(), index);
                max_alias_words = max_alias_words.max(alias.split_whitespace().count());
            }

            skills.push(Skill {
                canonical_name: canonical,
                aliases,
            });
        }

        Self {
            skills,
            by_alias,
            protected_tokens: protected_tokens
                .into_iter()
                .map(|t| t.into().to_lowercase())
                .collect(),
            max_alias_words,
        }
    }

    /// Resolves a lowercase token or phrase to its canonical skill.
    pub fn resolve(&self, alias: &str) -> Option<&Skill> {
        self.by_alias.get(alias).map(|&i| &self.skills[i])
    }

    /// True if the token must survive tokenization whole (e.g. "c++").
    pub fn is_protected(&self, token: &str) -> bool {
        self.protected_tokens.contains(token)
    }

    /// Longest alias length in words; the extractor scans n-grams up to this.
    pub fn max_alias_words(&self) -> usize {
        self.max_alias_words
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl Default for SkillDictionary {
    /// Built-in table covering common languages, frameworks, and tooling.
    /// Callers with a richer taxonomy construct their own via [`Self::new`].
    fn default() -> Self {
        let entries: Vec<(&str, Vec<&str>)> = vec![
            ("python", vec!["python3"]),
            ("rust", vec!["rustlang"]),
            ("go", vec!["golang"]),
            ("java", vec![]),
            ("c", vec![]),
            ("c++", vec!["cpp", "cplusplus"]),
            ("c#", vec!["csharp"]),
            ("javascript", vec!["js", "ecmascript"]),
            ("typescript", vec!["ts"]),
            ("ruby", vec![]),
            ("php", vec![]),
            ("swift", vec![]),
            ("kotlin", vec![]),
            ("scala", vec![]),
            ("sql", vec![]),
            ("nosql", vec![]),
            ("postgresql", vec!["postgres", "psql"]),
            ("mysql", vec![]),
            ("mongodb", vec!["mongo"]),
            ("redis", vec![]),
            ("elasticsearch", vec!["elastic search"]),
            ("kafka", vec!["apache kafka"]),
            ("node.js", vec!["nodejs", "node"]),
            ("react", vec!["reactjs", "react.js"]),
            ("angular", vec!["angularjs"]),
            ("vue", vec!["vuejs", "vue.js"]),
            ("django", vec![]),
            ("flask", vec![]),
            ("spring", vec!["spring boot"]),
            (".net", vec!["dotnet", "asp.net"]),
            ("docker", vec![]),
            ("kubernetes", vec!["k8s"]),
            ("terraform", vec![]),
            ("ansible", vec![]),
            ("aws", vec!["amazon web services"]),
            ("gcp", vec!["google cloud", "google cloud platform"]),
            ("azure", vec!["microsoft azure"]),
            ("linux", vec![]),
            ("git", vec![]),
            ("ci/cd", vec!["cicd", "continuous integration"]),
            ("graphql", vec![]),
            ("rest", vec!["rest api", "restful"]),
            ("grpc", vec![]),
            ("machine learning", vec!["ml"]),
            ("deep learning", vec![]),
            ("data analysis", vec![]),
            ("pytorch", vec![]),
            ("tensorflow", vec![]),
            ("pandas", vec![]),
            ("numpy", vec![]),
            ("spark", vec!["apache spark", "pyspark"]),
            ("hadoop", vec![]),
            ("airflow", vec!["apache airflow"]),
            ("distributed systems", vec![]),
            ("microservices", vec!["micro-services"]),
            ("agile", vec!["scrum"]),
        ];
        let protected = vec!["c++", "c#", "f#", "node.js", "react.js", "vue.js", ".net", "asp.net", "ci/cd"];
        Self::new(entries, protected)
    }
}
