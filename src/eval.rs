//! Offline Recall@K evaluation.
//!
//! Relevance is approximated by keyword presence: a labelled case lists the
//! keywords a good answer should surface, and recall is the share of them
//! that appear in the names or descriptions of the top-K recommendations.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::format::RecommendedItem;

pub const DEFAULT_CASES_PATH: &str = "config/eval_cases.json";
pub const DEFAULT_K: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EvalCase {
    pub query: String,
    pub expected_keywords: Vec<String>,
}

/// Built-in labelled queries used when no case file is present.
pub fn default_cases() -> Vec<EvalCase> {
    let case = |q: &str, kws: &[&str]| EvalCase {
        query: q.to_string(),
        expected_keywords: kws.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        case(
            "Need a Java developer who is good in collaborating with external teams.",
            &["Java", "Collaboration", "Teamwork", "Personality"],
        ),
        case(
            "Hiring a Sales Manager driven by targets.",
            &["Sales", "Motivation", "Manager", "Leadership"],
        ),
    ]
}

pub fn load_cases(path: &Path) -> anyhow::Result<Vec<EvalCase>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading eval cases {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing eval cases {}", path.display()))
}

/// Cases from `path`, or the built-in set if the file does not exist.
pub fn load_cases_or_default(path: &Path) -> anyhow::Result<Vec<EvalCase>> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no eval case file; using built-in cases");
        return Ok(default_cases());
    }
    load_cases(path)
}

pub fn recall_at_k(items: &[RecommendedItem], expected: &[String], k: usize) -> f64 {
    if expected.is_empty() {
        return 0.0;
    }
    let haystack = items
        .iter()
        .take(k)
        .map(|i| format!("{} {}", i.name, i.description))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let hits = expected
        .iter()
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .count();
    hits as f64 / expected.len() as f64
}

/// Mean over all cases; failed cases are simply absent from `recalls` and count as zero.
pub fn mean_recall(recalls: &[f64], total_cases: usize) -> f64 {
    if total_cases == 0 {
        return 0.0;
    }
    recalls.iter().sum::<f64>() / total_cases as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::YesNo;

    fn item(name: &str, description: &str) -> RecommendedItem {
        RecommendedItem {
            url: format!("https://example.test/{name}"),
            name: name.into(),
            adaptive_support: YesNo::No,
            description: description.into(),
            duration: 0,
            remote_support: YesNo::Yes,
            test_type: vec!["General".into()],
            match_score: None,
            matched_terms: Vec::new(),
            experience_gap: false,
        }
    }

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn recall_counts_case_insensitive_keyword_hits() {
        let items = vec![
            item("Core Java", "Object oriented programming"),
            item("OPQ32r", "Personality questionnaire for teamwork"),
        ];
        let r = recall_at_k(&items, &kws(&["java", "Teamwork", "Sales", "Leadership"]), 10);
        assert!((r - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recall_only_looks_at_top_k() {
        let items = vec![item("Core Java", ""), item("Sales Aptitude", "")];
        assert_eq!(recall_at_k(&items, &kws(&["sales"]), 1), 0.0);
        assert_eq!(recall_at_k(&items, &kws(&["sales"]), 2), 1.0);
    }

    #[test]
    fn empty_expectations_score_zero() {
        assert_eq!(recall_at_k(&[item("Java", "")], &[], 10), 0.0);
    }

    #[test]
    fn mean_recall_divides_by_all_cases() {
        assert!((mean_recall(&[1.0, 0.5], 3) - 0.5).abs() < 1e-9);
        assert_eq!(mean_recall(&[], 0), 0.0);
    }

    #[test]
    fn missing_case_file_falls_back_to_builtin() {
        let cases = load_cases_or_default(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(cases, default_cases());
    }
}
