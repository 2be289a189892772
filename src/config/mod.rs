// src/config/mod.rs
//! Service configuration (from `config/recommender.toml`, then env overrides).
//!
//! Resolution order:
//! 1) `$RECOMMENDER_CONFIG_PATH` or `config/recommender.toml`; a missing file
//!    means built-in defaults, a malformed one is an error.
//! 2) Env overrides: `CATALOG_PATH`, `RECOMMENDER_REPRESENTATION`,
//!    `RECOMMENDER_FLOOR` (for the active representation), `RECOMMENDER_TOP_K`.
//! 3) Sanitizing: out-of-range values fall back to their defaults.

use anyhow::Context;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use crate::catalog::{FallbackPolicy, DEFAULT_CATALOG_PATH};
use crate::filter::DEFAULT_EXPERIENCE_PENALTY;
use crate::format::{DEFAULT_DESCRIPTION_MAX_CHARS, DEFAULT_MAX_MATCHED_TERMS};
use crate::index::{Representation, DEFAULT_DENSE_DIMENSION};
use crate::rules::{CategoryKind, IntentKind, KeywordRule};

pub const DEFAULT_CONFIG_PATH: &str = "config/recommender.toml";

pub const ENV_CONFIG_PATH: &str = "RECOMMENDER_CONFIG_PATH";
pub const ENV_CATALOG_PATH: &str = "CATALOG_PATH";
pub const ENV_REPRESENTATION: &str = "RECOMMENDER_REPRESENTATION";
pub const ENV_FLOOR: &str = "RECOMMENDER_FLOOR";
pub const ENV_TOP_K: &str = "RECOMMENDER_TOP_K";

pub const DEFAULT_FLOOR_LEXICAL: f32 = 0.12;
pub const DEFAULT_FLOOR_DENSE: f32 = 0.20;
pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_MAX_TOP_K: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    pub catalog: CatalogSection,
    pub index: IndexSection,
    pub ranking: RankingSection,
    pub output: OutputSection,
    /// Overrides the built-in intent vocabulary when non-empty.
    pub intent: Option<Vec<KeywordRule<IntentKind>>>,
    /// Overrides the built-in soft-category vocabulary when non-empty.
    pub category: Option<Vec<KeywordRule<CategoryKind>>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub path: PathBuf,
    pub fallback: FallbackPolicy,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
            fallback: FallbackPolicy::Builtin,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexSection {
    pub representation: Representation,
    pub dense_dimension: usize,
}

impl Default for IndexSection {
    fn default() -> Self {
        Self {
            representation: Representation::Lexical,
            dense_dimension: DEFAULT_DENSE_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingSection {
    pub floor_lexical: f32,
    pub floor_dense: f32,
    pub experience_penalty: f32,
    pub top_k: usize,
    pub max_top_k: usize,
}

impl Default for RankingSection {
    fn default() -> Self {
        Self {
            floor_lexical: DEFAULT_FLOOR_LEXICAL,
            floor_dense: DEFAULT_FLOOR_DENSE,
            experience_penalty: DEFAULT_EXPERIENCE_PENALTY,
            top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
        }
    }
}

impl RankingSection {
    /// The floor is tuned per representation.
    pub fn floor_for(&self, representation: Representation) -> f32 {
        match representation {
            Representation::Lexical => self.floor_lexical,
            Representation::Dense => self.floor_dense,
        }
    }

    /// Requested K capped at `max_top_k`, never below 1; `None` means the default.
    pub fn effective_top_k(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.top_k).min(self.max_top_k).max(1)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub description_max_chars: usize,
    pub max_matched_terms: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            description_max_chars: DEFAULT_DESCRIPTION_MAX_CHARS,
            max_matched_terms: DEFAULT_MAX_MATCHED_TERMS,
        }
    }
}

impl RecommenderConfig {
    /// Resolve path from env, load, apply env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut cfg = if path.exists() {
            let cfg = Self::load_from_file(&path)?;
            info!(path = %path.display(), "recommender config loaded");
            cfg
        } else {
            warn!(path = %path.display(), "recommender config missing, using defaults");
            Self::default()
        };

        cfg.apply_env_overrides()?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading recommender config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing recommender config at {}", path.display()))
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: Self = toml::from_str(toml_str)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        if let Ok(p) = std::env::var(ENV_CATALOG_PATH) {
            if !p.trim().is_empty() {
                self.catalog.path = PathBuf::from(p);
            }
        }
        if let Ok(r) = std::env::var(ENV_REPRESENTATION) {
            self.index.representation = r
                .parse()
                .with_context(|| format!("{ENV_REPRESENTATION} is invalid"))?;
        }
        if let Some(floor) = parse_unit_env(std::env::var(ENV_FLOOR).ok()) {
            match self.index.representation {
                Representation::Lexical => self.ranking.floor_lexical = floor,
                Representation::Dense => self.ranking.floor_dense = floor,
            }
        }
        if let Some(k) = std::env::var(ENV_TOP_K)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
        {
            self.ranking.top_k = k;
        }
        Ok(())
    }

    fn sanitize(&mut self) {
        let r = &mut self.ranking;
        if !(-1.0..=1.0).contains(&r.floor_lexical) {
            r.floor_lexical = DEFAULT_FLOOR_LEXICAL;
        }
        if !(-1.0..=1.0).contains(&r.floor_dense) {
            r.floor_dense = DEFAULT_FLOOR_DENSE;
        }
        if !(0.0..=1.0).contains(&r.experience_penalty) {
            r.experience_penalty = DEFAULT_EXPERIENCE_PENALTY;
        }
        if r.max_top_k == 0 {
            r.max_top_k = DEFAULT_MAX_TOP_K;
        }
        if r.top_k == 0 {
            r.top_k = DEFAULT_TOP_K;
        }
        r.top_k = r.top_k.min(r.max_top_k);

        if self.index.dense_dimension == 0 {
            self.index.dense_dimension = DEFAULT_DENSE_DIMENSION;
        }
        if self.output.description_max_chars == 0 {
            self.output.description_max_chars = DEFAULT_DESCRIPTION_MAX_CHARS;
        }
    }
}

// parse optional float env and clamp to <0.0..=1.0>
fn parse_unit_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}
