//! Result formatter: the wire shape of one recommendation.

use serde::{Deserialize, Serialize};

use crate::catalog::{YesNo, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION};
use crate::filter::ScoredCandidate;

pub const DEFAULT_DESCRIPTION_MAX_CHARS: usize = 400;
pub const DEFAULT_MAX_MATCHED_TERMS: usize = 3;
const CONTINUATION: &str = "...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub url: String,
    pub name: String,
    pub adaptive_support: YesNo,
    pub description: String,
    pub duration: u32,
    pub remote_support: YesNo,
    pub test_type: Vec<String>,
    /// Adjusted score as a rounded percentage (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub experience_gap: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub description_max_chars: usize,
    pub max_matched_terms: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            description_max_chars: DEFAULT_DESCRIPTION_MAX_CHARS,
            max_matched_terms: DEFAULT_MAX_MATCHED_TERMS,
        }
    }
}

/// Format selected candidates in their given order.
pub fn format(selected: &[ScoredCandidate<'_>], opts: &FormatOptions) -> Vec<RecommendedItem> {
    selected.iter().map(|c| format_one(c, opts)).collect()
}

fn format_one(c: &ScoredCandidate<'_>, opts: &FormatOptions) -> RecommendedItem {
    let r = c.record;
    let description = if r.description.trim().is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        truncate_chars(&r.description, opts.description_max_chars)
    };
    let test_type = if r.categories.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        r.categories.clone()
    };

    RecommendedItem {
        url: r.identity.clone(),
        name: r.name.clone(),
        adaptive_support: r.adaptive_support,
        description,
        duration: r.duration,
        remote_support: r.remote_support,
        test_type,
        match_score: percentage(c.adjusted_score),
        matched_terms: c
            .matched_terms
            .iter()
            .take(opts.max_matched_terms)
            .cloned()
            .collect(),
        experience_gap: c.experience_gap,
    }
}

fn percentage(score: f32) -> Option<u8> {
    if !score.is_finite() {
        return None;
    }
    Some((score * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// Cut at `max` characters (not bytes) and mark the cut.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}{CONTINUATION}", s[..byte_idx].trim_end()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentRecord;

    fn rec(description: &str) -> AssessmentRecord {
        AssessmentRecord {
            identity: "https://x/a".into(),
            name: "A".into(),
            description: description.into(),
            categories: vec![],
            duration: 0,
            min_experience: 0,
            adaptive_support: YesNo::No,
            remote_support: YesNo::Yes,
        }
    }

    fn cand<'a>(r: &'a AssessmentRecord, score: f32, terms: &[&str]) -> ScoredCandidate<'a> {
        ScoredCandidate {
            record: r,
            raw_score: score,
            adjusted_score: score,
            experience_gap: false,
            matched_terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn truncation_counts_characters_and_marks_the_cut() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly", 7), "exactly");
        assert_eq!(truncate_chars("čeština je fajn", 7), "čeština...");
        assert_eq!(truncate_chars("two words", 4), "two...");
    }

    #[test]
    fn item_fills_defaults_and_caps_terms() {
        let r = rec("");
        let items = format(
            &[cand(&r, 0.4567, &["java", "sql", "python", "excel"])],
            &FormatOptions::default(),
        );
        let it = &items[0];
        assert_eq!(it.description, DEFAULT_DESCRIPTION);
        assert_eq!(it.test_type, vec!["General"]);
        assert_eq!(it.match_score, Some(46));
        assert_eq!(it.matched_terms, vec!["java", "sql", "python"]);
    }

    #[test]
    fn serialized_shape_omits_empty_extras() {
        let r = rec("d");
        let items = format(&[cand(&r, 0.5, &[])], &FormatOptions::default());
        let v = serde_json::to_value(&items[0]).unwrap();
        assert_eq!(v["url"], "https://x/a");
        assert_eq!(v["adaptive_support"], "No");
        assert_eq!(v["remote_support"], "Yes");
        assert_eq!(v["match_score"], 50);
        assert!(v.get("matched_terms").is_none());
        assert!(v.get("experience_gap").is_none());
    }

    #[test]
    fn negative_scores_clamp_to_zero_percent() {
        assert_eq!(percentage(-0.3), Some(0));
        assert_eq!(percentage(f32::NAN), None);
    }
}
