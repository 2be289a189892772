//! # Catalog Store
//!
//! Loads the assessment catalog from a JSON array and applies every field
//! default at load time, so the index, filter and formatter only ever see
//! fully populated [`AssessmentRecord`]s.
//!
//! - Field aliases: `identity`/`url`/`id`, `categories`/`test_type`.
//! - Missing categories are inferred from name + description; `["General"]` otherwise.
//! - A missing or malformed file degrades to the built-in seed (or an empty
//!   catalog, depending on [`FallbackPolicy`]).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{info, warn};

use crate::error::CatalogError;
use crate::rules::KeywordRules;

pub const DEFAULT_CATALOG_PATH: &str = "data/assessments.json";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_CATEGORY: &str = "General";

/// Yes/No attribute as published by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Some(Self::Yes),
            "no" | "n" | "false" => Some(Self::No),
            _ => None,
        }
    }
}

/// One catalog entry with all defaults resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    pub identity: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    pub duration: u32,
    pub min_experience: u32,
    pub adaptive_support: YesNo,
    pub remote_support: YesNo,
}

impl AssessmentRecord {
    /// Text blob the feature index embeds: name, description, then categories.
    pub fn feature_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.description,
            self.categories.join(" ")
        )
    }
}

/* ----------------------------
Wire shape (lenient)
---------------------------- */

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Int(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Lenient {
    fn as_u32(&self) -> Option<u32> {
        static RE_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("number regex"));
        match self {
            Lenient::Int(n) => Some((*n).min(u32::MAX as u64) as u32),
            Lenient::Float(f) if f.is_finite() && *f >= 0.0 => Some(f.round() as u32),
            Lenient::Text(s) => RE_NUM.find(s).and_then(|m| m.as_str().parse().ok()),
            _ => None,
        }
    }

    fn as_yes_no(&self) -> Option<YesNo> {
        match self {
            Lenient::Bool(true) => Some(YesNo::Yes),
            Lenient::Bool(false) => Some(YesNo::No),
            Lenient::Text(s) => YesNo::parse(s),
            _ => None,
        }
    }
}

/// Identity may arrive as `identity`, `url` or `id` (first present wins);
/// categories as `categories` or `test_type`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    identity: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    test_type: Option<Vec<String>>,
    #[serde(default)]
    duration: Option<Lenient>,
    #[serde(default)]
    min_experience: Option<Lenient>,
    #[serde(default)]
    adaptive_support: Option<Lenient>,
    #[serde(default)]
    remote_support: Option<Lenient>,
}

impl RawRecord {
    fn identity(&self) -> Option<&str> {
        [&self.identity, &self.url, &self.id]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    /// `None` when the record carries no usable identity.
    fn into_record(self) -> Option<AssessmentRecord> {
        let identity = self.identity()?.to_string();
        let name = self
            .name
            .map(|n| clean_text(&n))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| identity.clone());
        let description = self
            .description
            .map(|d| clean_text(&d))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        let mut categories: Vec<String> = self
            .categories
            .or(self.test_type)
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if categories.is_empty() {
            categories = infer_categories(&format!("{name} {description}"));
        }

        Some(AssessmentRecord {
            identity,
            name,
            description,
            categories,
            duration: self.duration.as_ref().and_then(Lenient::as_u32).unwrap_or(0),
            min_experience: self
                .min_experience
                .as_ref()
                .and_then(Lenient::as_u32)
                .unwrap_or(0),
            adaptive_support: self
                .adaptive_support
                .as_ref()
                .and_then(Lenient::as_yes_no)
                .unwrap_or(YesNo::No),
            remote_support: self
                .remote_support
                .as_ref()
                .and_then(Lenient::as_yes_no)
                .unwrap_or(YesNo::Yes),
        })
    }
}

/// Decode HTML entities and collapse whitespace.
fn clean_text(s: &str) -> String {
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));
    let decoded = html_escape::decode_html_entities(s);
    RE_WS.replace_all(decoded.trim(), " ").into_owned()
}

/// Keyword table mapping free text to the catalog's official category labels.
static CATEGORY_INFERENCE: Lazy<KeywordRules<String>> = Lazy::new(|| {
    KeywordRules::from_pairs([
        (
            "Ability & Aptitude",
            &[
                "cognitive",
                "numerical",
                "verbal",
                "deductive",
                "inductive",
                "ability",
                "calculate",
            ][..],
        ),
        (
            "Knowledge & Skills",
            &[
                "python",
                "java",
                "coding",
                "technical",
                "knowledge",
                "skill",
                "sql",
                "react",
                "excel",
            ][..],
        ),
        (
            "Personality & Behavior",
            &[
                "personality",
                "behavior",
                "opq",
                "motivation",
                "culture",
                "style",
            ][..],
        ),
        (
            "Biodata & Situational Judgement",
            &["manager", "leadership", "sjt", "scenario", "judgement"][..],
        ),
        ("Simulations", &["simulation", "interactive"][..]),
        ("Development & 360", &["360", "development"][..]),
    ])
});

/// Infer category labels from free text, in table order; `["General"]` if nothing matches.
pub fn infer_categories(text: &str) -> Vec<String> {
    let hits = CATEGORY_INFERENCE.matching_tags(text);
    if hits.is_empty() {
        vec![DEFAULT_CATEGORY.to_string()]
    } else {
        hits
    }
}

/// What to serve when the persisted catalog cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    #[default]
    Builtin,
    Empty,
}

/// Parse a catalog from a JSON string, applying load-time defaults.
///
/// Only a document that is not a JSON array fails; individual records that
/// cannot be read, or carry no identity, are skipped with a warning.
pub fn parse_catalog(json: &str) -> Result<Vec<AssessmentRecord>, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut out = Vec::with_capacity(raw.len());
    for (pos, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(value) {
            Ok(r) => match r.into_record() {
                Some(rec) => out.push(rec),
                None => warn!(position = pos, "catalog record without identity skipped"),
            },
            Err(e) => warn!(position = pos, error = %e, "unreadable catalog record skipped"),
        }
    }
    Ok(out)
}

/// Strict load: surfaces the reason the file could not be used.
pub fn load_catalog(path: &Path) -> Result<Vec<AssessmentRecord>, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&content).map_err(|source| CatalogError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the catalog, degrading to the fallback on any error. Never fails.
pub fn load_or_fallback(path: &Path, policy: FallbackPolicy) -> Vec<AssessmentRecord> {
    match load_catalog(path) {
        Ok(records) => {
            info!(path = %path.display(), records = records.len(), "catalog loaded");
            records
        }
        Err(err) => {
            warn!(error = %err, ?policy, "catalog unavailable, serving fallback");
            match policy {
                FallbackPolicy::Builtin => seed_catalog(),
                FallbackPolicy::Empty => Vec::new(),
            }
        }
    }
}

/// Built-in seed with a handful of common technical and behavioral assessments.
pub fn seed_catalog() -> Vec<AssessmentRecord> {
    const BASE: &str = "https://www.shl.com/solutions/products/product-catalog/view/";
    let seed: [(&str, &str, &str, &[&str], u32, u32, YesNo); 8] = [
        (
            "core-java-entry-level-new",
            "Core Java (Entry Level) (New)",
            "Multi-choice test that measures knowledge of basic Java constructs, OOP concepts, file handling and exception handling.",
            &["Knowledge & Skills"],
            13,
            0,
            YesNo::No,
        ),
        (
            "python-new",
            "Python (New)",
            "Multi-choice test that measures knowledge of Python programming, data structures, modules and libraries.",
            &["Knowledge & Skills"],
            11,
            0,
            YesNo::No,
        ),
        (
            "sql-server-new",
            "SQL Server (New)",
            "Measures knowledge of SQL Server queries, stored procedures, indexing and database administration.",
            &["Knowledge & Skills"],
            10,
            1,
            YesNo::No,
        ),
        (
            "verify-numerical-ability",
            "Verify - Numerical Ability",
            "Adaptive test measuring the ability to make correct decisions or inferences from numerical or statistical data.",
            &["Ability & Aptitude"],
            20,
            0,
            YesNo::Yes,
        ),
        (
            "occupational-personality-questionnaire-opq32r",
            "Occupational Personality Questionnaire OPQ32r",
            "Personality questionnaire describing behavioral style at work: relationships with people, thinking style, feelings and emotions.",
            &["Personality & Behavior"],
            25,
            0,
            YesNo::No,
        ),
        (
            "motivation-questionnaire-mqm5",
            "Motivation Questionnaire MQM5",
            "Measures the factors that energise a person at work and the culture and style in which they thrive on a team.",
            &["Personality & Behavior"],
            25,
            0,
            YesNo::No,
        ),
        (
            "manager-8-0-jfa",
            "Manager 8.0 JFA",
            "Situational judgement and biodata assessment for managers who lead teams, communicate priorities and coach people.",
            &["Biodata & Situational Judgement", "Personality & Behavior"],
            30,
            3,
            YesNo::No,
        ),
        (
            "automata-fix-new",
            "Automata - Fix (New)",
            "Interactive coding simulation where candidates find and fix bugs in existing code across several languages.",
            &["Simulations", "Knowledge & Skills"],
            20,
            1,
            YesNo::No,
        ),
    ];

    seed.into_iter()
        .map(
            |(slug, name, description, categories, duration, min_experience, adaptive)| {
                AssessmentRecord {
                    identity: format!("{BASE}{slug}/"),
                    name: name.to_string(),
                    description: description.to_string(),
                    categories: categories.iter().map(|c| c.to_string()).collect(),
                    duration,
                    min_experience,
                    adaptive_support: adaptive,
                    remote_support: YesNo::Yes,
                }
            },
        )
        .collect()
}
