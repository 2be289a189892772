//! # Recommendation Engine
//! Owns the read-only [`CatalogIndex`] plus rule tables and ranking settings,
//! and runs the per-request pipeline:
//! encode query → score → filter (floor, experience gap) → classify intent →
//! select (balanced or top-K) → format.
//!
//! No I/O after construction; every call is a pure function of the index and
//! the request, so one `Arc<Recommender>` is shared across requests without locks.

use tracing::debug;

use crate::catalog::{self, AssessmentRecord};
use crate::config::{RankingSection, RecommenderConfig};
use crate::experience::estimate_years;
use crate::filter::{self, FilterParams, ScoredCandidate};
use crate::format::{self, FormatOptions, RecommendedItem};
use crate::index::{CatalogIndex, IndexOptions};
use crate::rules::RuleTables;
use crate::scoring;
use crate::telemetry::anon_hash;

/// One search, already validated by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendRequest {
    pub query: String,
    /// Requester's years of experience; estimated from the query text when absent.
    pub experience_years: Option<u32>,
    pub top_k: Option<usize>,
}

impl RecommendRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Structured (role, skills, experience) input folded into an equivalent query string.
    pub fn structured(role: &str, skills: &[String], experience_years: u32) -> Self {
        let mut parts: Vec<&str> = Vec::with_capacity(skills.len() + 1);
        parts.push(role.trim());
        parts.extend(skills.iter().map(|s| s.trim()));
        let query = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            query,
            experience_years: Some(experience_years),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: Option<usize>) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_experience(mut self, years: Option<u32>) -> Self {
        self.experience_years = years;
        self
    }
}

#[derive(Debug)]
pub struct Recommender {
    index: CatalogIndex,
    rules: RuleTables,
    ranking: RankingSection,
    output: FormatOptions,
}

impl Recommender {
    pub fn new(
        index: CatalogIndex,
        rules: RuleTables,
        ranking: RankingSection,
        output: FormatOptions,
    ) -> Self {
        Self {
            index,
            rules,
            ranking,
            output,
        }
    }

    /// Load the catalog named by `cfg` (falling back if needed) and build the index.
    /// Potentially slow; run it before accepting requests.
    pub fn from_config(cfg: &RecommenderConfig) -> Self {
        let records = catalog::load_or_fallback(&cfg.catalog.path, cfg.catalog.fallback);
        Self::with_records(records, cfg)
    }

    pub fn with_records(records: Vec<AssessmentRecord>, cfg: &RecommenderConfig) -> Self {
        let index = CatalogIndex::build(
            records,
            IndexOptions {
                representation: cfg.index.representation,
                dense_dimension: cfg.index.dense_dimension,
            },
        );
        let rules = RuleTables::from_config(cfg.intent.clone(), cfg.category.clone());
        let output = FormatOptions {
            description_max_chars: cfg.output.description_max_chars,
            max_matched_terms: cfg.output.max_matched_terms,
        };
        Self::new(index, rules, cfg.ranking.clone(), output)
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Relevance floor for the active representation.
    pub fn floor(&self) -> f32 {
        self.ranking.floor_for(self.index.representation())
    }

    pub fn default_top_k(&self) -> usize {
        self.ranking.effective_top_k(None)
    }

    /// Ranked, deduplicated and balanced candidates, before formatting.
    pub fn rank(&self, req: &RecommendRequest) -> Vec<ScoredCandidate<'_>> {
        if self.index.is_empty() || req.query.trim().is_empty() {
            return Vec::new();
        }

        let top_k = self.ranking.effective_top_k(req.top_k);
        let experience = req.experience_years.or_else(|| estimate_years(&req.query));

        let query_vec = self.index.encode_query(&req.query);
        let scored = scoring::score(&query_vec, &self.index);

        let params = FilterParams {
            floor: self.floor(),
            experience_penalty: self.ranking.experience_penalty,
        };
        let candidates = filter::filter(
            &scored,
            self.index.records(),
            experience,
            &req.query,
            &params,
        );
        let survivors = candidates.len();

        let intent = self.rules.intent.classify(&req.query);
        let selected = crate::select::select(candidates, intent, &self.rules.category, top_k);

        debug!(
            query_id = %anon_hash(&req.query),
            ?experience,
            survivors,
            selected = selected.len(),
            balanced = intent.is_mixed(),
            "ranked"
        );
        selected
    }

    /// Full pipeline: ranked candidates in their final wire shape.
    pub fn recommend(&self, req: &RecommendRequest) -> Vec<RecommendedItem> {
        let selected = self.rank(req);
        format::format(&selected, &self.output)
    }
}
