//! Candidate filter: relevance floor, experience-gap penalty, matched terms.

use std::cmp::Ordering;

use crate::catalog::AssessmentRecord;
use crate::index::tokenize;
use crate::rules::normalize;

pub const DEFAULT_EXPERIENCE_PENALTY: f32 = 0.4;

/// Request-local view of a catalog record after scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub record: &'a AssessmentRecord,
    pub raw_score: f32,
    pub adjusted_score: f32,
    pub experience_gap: bool,
    pub matched_terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Minimum raw similarity; representation-dependent.
    pub floor: f32,
    /// Multiplier applied when the requester lacks the record's minimum experience.
    pub experience_penalty: f32,
}

impl FilterParams {
    pub fn new(floor: f32) -> Self {
        Self {
            floor,
            experience_penalty: DEFAULT_EXPERIENCE_PENALTY,
        }
    }
}

/// Drop sub-floor candidates, penalize experience gaps, then re-sort by adjusted score.
///
/// `requester_experience == None` means unknown: no penalty is applied.
pub fn filter<'a>(
    scored: &[(usize, f32)],
    records: &'a [AssessmentRecord],
    requester_experience: Option<u32>,
    query: &str,
    params: &FilterParams,
) -> Vec<ScoredCandidate<'a>> {
    let query_norm = normalize(query);

    let mut out: Vec<ScoredCandidate<'a>> = scored
        .iter()
        .filter(|(_, raw)| *raw >= params.floor)
        .filter_map(|&(pos, raw)| {
            let record = records.get(pos)?;
            let experience_gap =
                requester_experience.is_some_and(|years| years < record.min_experience);
            let adjusted_score = if experience_gap {
                raw * params.experience_penalty
            } else {
                raw
            };
            Some(ScoredCandidate {
                record,
                raw_score: raw,
                adjusted_score,
                experience_gap,
                matched_terms: matched_terms(record, &query_norm),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.adjusted_score
            .partial_cmp(&a.adjusted_score)
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Record vocabulary (category labels, then name and label tokens) found in the query.
fn matched_terms(record: &AssessmentRecord, query_norm: &str) -> Vec<String> {
    let mut vocab: Vec<String> = record.categories.iter().map(|c| normalize(c)).collect();
    vocab.extend(tokenize(&record.name));
    for c in &record.categories {
        vocab.extend(tokenize(c));
    }

    let mut out: Vec<String> = Vec::new();
    for term in vocab {
        if !term.is_empty() && query_norm.contains(term.as_str()) && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::YesNo;

    fn rec(id: &str, name: &str, categories: &[&str], min_exp: u32) -> AssessmentRecord {
        AssessmentRecord {
            identity: id.into(),
            name: name.into(),
            description: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            duration: 0,
            min_experience: min_exp,
            adaptive_support: YesNo::No,
            remote_support: YesNo::Yes,
        }
    }

    #[test]
    fn floor_drops_weak_candidates() {
        let records = vec![rec("a", "A", &[], 0), rec("b", "B", &[], 0)];
        let out = filter(
            &[(0, 0.5), (1, 0.1)],
            &records,
            None,
            "",
            &FilterParams::new(0.12),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.identity, "a");
    }

    #[test]
    fn experience_gap_penalty_can_reorder() {
        let records = vec![rec("senior", "S", &[], 5), rec("junior", "J", &[], 0)];
        let out = filter(
            &[(0, 0.9), (1, 0.5)],
            &records,
            Some(2),
            "",
            &FilterParams::new(0.2),
        );
        assert_eq!(out[0].record.identity, "junior");
        assert!(!out[0].experience_gap);
        assert_eq!(out[0].adjusted_score, out[0].raw_score);

        assert_eq!(out[1].record.identity, "senior");
        assert!(out[1].experience_gap);
        assert!((out[1].adjusted_score - 0.9 * 0.4).abs() < 1e-6);
    }

    #[test]
    fn unknown_experience_is_not_penalized() {
        let records = vec![rec("senior", "S", &[], 5)];
        let out = filter(&[(0, 0.9)], &records, None, "", &FilterParams::new(0.2));
        assert!(!out[0].experience_gap);
        assert_eq!(out[0].adjusted_score, 0.9);

        // meeting the minimum exactly is not a gap
        let out = filter(&[(0, 0.9)], &records, Some(5), "", &FilterParams::new(0.2));
        assert!(!out[0].experience_gap);
    }

    #[test]
    fn matched_terms_come_from_record_vocabulary() {
        let records = vec![rec(
            "a",
            "Core Java (Entry Level)",
            &["Knowledge & Skills"],
            0,
        )];
        let out = filter(
            &[(0, 0.5)],
            &records,
            None,
            "Java developer with strong SKILLS",
            &FilterParams::new(0.1),
        );
        assert_eq!(out[0].matched_terms, vec!["java", "skills"]);
    }

    #[test]
    fn out_of_range_positions_are_ignored() {
        let records = vec![rec("a", "A", &[], 0)];
        let out = filter(&[(7, 0.9)], &records, None, "", &FilterParams::new(0.1));
        assert!(out.is_empty());
    }
}
