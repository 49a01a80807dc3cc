//! Keyword coverage — the share of a resume's tokens that are caller-supplied keywords.
//!
//! Deliberately cheap: lowercase, split on whitespace, count hits. Punctuation stays
//! attached to tokens, so `"python,"` does not match the keyword `python`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Normalized keyword set: trimmed, lowercased, no empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    /// Parses form values, each of which may hold several comma-separated keywords.
    pub fn from_form_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let split: Vec<String> = values
            .into_iter()
            .flat_map(|v| {
                v.as_ref()
                    .split(',')
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        Self::new(split)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.0.into_iter().collect()
    }
}

/// Fraction of whitespace tokens in `text` that are keywords, in `[0, 1]`.
/// Zero for an empty keyword set or a text without tokens.
pub fn coverage(text: &str, keywords: &KeywordSet) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let lowered = text.to_lowercase();
    let mut total = 0usize;
    let mut hits = 0usize;
    for token in lowered.split_whitespace() {
        total += 1;
        if keywords.contains(token) {
            hits += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    hits as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_set_normalizes() {
        let set = KeywordSet::new([" Python ", "AWS", "", "python"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("python"));
        assert!(set.contains("aws"));
    }

    #[test]
    fn test_from_form_values_splits_commas() {
        let set = KeywordSet::from_form_values(["python, aws", "Docker", " , "]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["aws", "docker", "python"]);
    }

    #[test]
    fn test_coverage_ratio() {
        let keywords = KeywordSet::new(["python", "aws"]);
        let score = coverage("I am a python developer skilled in aws and docker", &keywords);
        assert!((score - 0.2).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn test_coverage_counts_repeats() {
        let keywords = KeywordSet::new(["rust"]);
        assert!((coverage("Rust rust RUST go", &keywords) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_coverage_keeps_punctuation_on_tokens() {
        let keywords = KeywordSet::new(["python"]);
        assert_eq!(coverage("python, java", &keywords), 0.0);
    }

    #[test]
    fn test_coverage_zero_cases() {
        let keywords = KeywordSet::new(["python"]);
        assert_eq!(coverage("", &keywords), 0.0);
        assert_eq!(coverage("   \n\t", &keywords), 0.0);
        assert_eq!(coverage("python", &KeywordSet::default()), 0.0);
        assert_eq!(coverage("I cook great pasta", &keywords), 0.0);
    }

    #[test]
    fn test_keyword_set_deserializes_from_list() {
        let set: KeywordSet = serde_json::from_str(r#"["Rust", "Tokio"]"#).unwrap();
        assert!(set.contains("rust"));
        assert!(set.contains("tokio"));
    }
}
