//! Cosine similarity of a query vector against every indexed record.

use std::cmp::Ordering;

use crate::index::{CatalogIndex, FeatureVector};

/// Cosine similarity in [-1, 1]; 0 for zero-norm or mismatched vectors.
pub fn cosine(a: &FeatureVector, b: &FeatureVector) -> f32 {
    let (na, nb) = (a.norm(), b.norm());
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    match a.dot(b) {
        Some(dot) => (dot / (na * nb)).clamp(-1.0, 1.0),
        None => 0.0,
    }
}

/// `(position, score)` for every record, descending by score.
/// Stable sort: equal scores keep catalog insertion order.
pub fn score(query: &FeatureVector, index: &CatalogIndex) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = index
        .vectors()
        .iter()
        .enumerate()
        .map(|(pos, v)| (pos, cosine(query, v)))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}
