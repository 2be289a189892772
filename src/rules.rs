//! Declarative keyword tables for query intent and record categories.
//!
//! A table is an ordered list of `{ tag, terms }` rules. Matching is a
//! case-insensitive substring test on whitespace-normalized text, so
//! "lead" matches "Leads" and "team" matches "teams".
//!
//! TOML shape (both arrays optional, defaults below):
//! ```toml
//! [[intent]]
//! tag = "technical"
//! terms = ["java", "python", "sql", "code", "technical", "skill"]
//!
//! [[category]]
//! tag = "soft"
//! terms = ["personality", "behavior", "biodata"]
//! ```

use serde::Deserialize;

use crate::catalog::AssessmentRecord;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeywordRule<T> {
    pub tag: T,
    pub terms: Vec<String>,
}

/// Ordered vocabulary -> tag table.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRules<T> {
    rules: Vec<KeywordRule<T>>,
}

impl<T: Clone + PartialEq> KeywordRules<T> {
    pub fn new(rules: Vec<KeywordRule<T>>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| KeywordRule {
                tag: r.tag,
                terms: r
                    .terms
                    .iter()
                    .map(|t| normalize(t))
                    .filter(|t| !t.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn from_pairs<'a, I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, &'a [&'a str])>,
        S: Into<T>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(tag, terms)| KeywordRule {
                    tag: tag.into(),
                    terms: terms.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        )
    }

    /// Distinct tags whose vocabulary hits `text`, in table order.
    pub fn matching_tags(&self, text: &str) -> Vec<T> {
        let text = normalize(text);
        let mut out: Vec<T> = Vec::new();
        for rule in &self.rules {
            if out.contains(&rule.tag) {
                continue;
            }
            if rule.terms.iter().any(|t| text.contains(t.as_str())) {
                out.push(rule.tag.clone());
            }
        }
        out
    }

    pub fn has_tag(&self, text: &str, tag: &T) -> bool {
        let text = normalize(text);
        self.rules
            .iter()
            .filter(|r| &r.tag == tag)
            .any(|r| r.terms.iter().any(|t| text.contains(t.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.iter().all(|r| r.terms.is_empty())
    }
}

/// Lowercase + condensed spaces.
pub(crate) fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/* ----------------------------
Intent classifier
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Technical,
    Behavioral,
}

/// What a query asks for; both flags may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Intent {
    pub needs_technical: bool,
    pub needs_behavioral: bool,
}

impl Intent {
    /// Both intents present: the selector interleaves categories.
    pub fn is_mixed(&self) -> bool {
        self.needs_technical && self.needs_behavioral
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: KeywordRules<IntentKind>,
}

impl IntentClassifier {
    pub fn new(rules: KeywordRules<IntentKind>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, query: &str) -> Intent {
        let tags = self.rules.matching_tags(query);
        Intent {
            needs_technical: tags.contains(&IntentKind::Technical),
            needs_behavioral: tags.contains(&IntentKind::Behavioral),
        }
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(KeywordRules::from_pairs([
            (
                IntentKind::Technical,
                &["java", "python", "sql", "code", "technical", "skill"][..],
            ),
            (
                IntentKind::Behavioral,
                &["lead", "team", "communicate", "behavior", "manager"][..],
            ),
        ]))
    }
}

/* ----------------------------
Category tagger
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTag {
    pub is_soft: bool,
}

/// Buckets records as soft or technical; there is no third bucket.
#[derive(Debug, Clone)]
pub struct CategoryTagger {
    rules: KeywordRules<CategoryKind>,
}

impl CategoryTagger {
    pub fn new(rules: KeywordRules<CategoryKind>) -> Self {
        Self { rules }
    }

    pub fn tag(&self, record: &AssessmentRecord) -> CategoryTag {
        let joined = record.categories.join(" ");
        CategoryTag {
            is_soft: self.rules.has_tag(&joined, &CategoryKind::Soft),
        }
    }
}

impl Default for CategoryTagger {
    fn default() -> Self {
        Self::new(KeywordRules::from_pairs([(
            CategoryKind::Soft,
            &["personality", "behavior", "biodata"][..],
        )]))
    }
}

/// Both tables, as consumed by the recommender.
#[derive(Debug, Clone, Default)]
pub struct RuleTables {
    pub intent: IntentClassifier,
    pub category: CategoryTagger,
}

impl RuleTables {
    /// Build from optional config overrides; an absent or empty table keeps the default.
    pub fn from_config(
        intent: Option<Vec<KeywordRule<IntentKind>>>,
        category: Option<Vec<KeywordRule<CategoryKind>>>,
    ) -> Self {
        let intent = intent
            .map(KeywordRules::new)
            .filter(|r| !r.is_empty())
            .map(IntentClassifier::new)
            .unwrap_or_default();
        let category = category
            .map(KeywordRules::new)
            .filter(|r| !r.is_empty())
            .map(CategoryTagger::new)
            .unwrap_or_default();
        Self { intent, category }
    }
}
