//! Balanced selector.
//!
//! - Single intent (or none): adjusted-score order, dedup by identity, stop at `top_k`.
//! - Mixed intent: partition *all* candidates into technical/soft buckets
//!   (order preserved), interleave technical[i], soft[i] until both run out,
//!   dedup by identity, then truncate to `top_k`.

use std::collections::HashSet;

use crate::filter::ScoredCandidate;
use crate::rules::{CategoryTagger, Intent};

pub fn select<'a>(
    candidates: Vec<ScoredCandidate<'a>>,
    intent: Intent,
    tagger: &CategoryTagger,
    top_k: usize,
) -> Vec<ScoredCandidate<'a>> {
    if intent.is_mixed() {
        balanced(candidates, tagger, top_k)
    } else {
        unbalanced(candidates, top_k)
    }
}

fn unbalanced(candidates: Vec<ScoredCandidate<'_>>, top_k: usize) -> Vec<ScoredCandidate<'_>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(top_k.min(candidates.len()));
    for c in candidates {
        if out.len() >= top_k {
            break;
        }
        if seen.insert(c.record.identity.as_str()) {
            out.push(c);
        }
    }
    out
}

fn balanced<'a>(
    candidates: Vec<ScoredCandidate<'a>>,
    tagger: &CategoryTagger,
    top_k: usize,
) -> Vec<ScoredCandidate<'a>> {
    let (soft, technical): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| tagger.tag(c.record).is_soft);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let mut tech_iter = technical.into_iter();
    let mut soft_iter = soft.into_iter();
    loop {
        let (t, s) = (tech_iter.next(), soft_iter.next());
        if t.is_none() && s.is_none() {
            break;
        }
        for c in [t, s].into_iter().flatten() {
            if seen.insert(c.record.identity.as_str()) {
                out.push(c);
            }
        }
    }
    out.truncate(top_k);
    out
}
