//! # Feature Index
//!
//! Builds one feature vector per catalog record, once, right after the
//! catalog loads. Two interchangeable encoders sit behind [`TextEncoder`]:
//!
//! - [`TfIdfEncoder`]: sparse lexical vectors over the catalog vocabulary,
//!   `idf = ln((1 + n) / (1 + df)) + 1`, L2-normalized.
//! - [`HashedEncoder`]: fixed-dimension dense vectors from signed feature
//!   hashing of word unigrams and character trigrams, L2-normalized.
//!
//! Whichever encoder built the index also encodes incoming queries, so query
//! and record vectors always share one representation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::time::Instant;
use tracing::info;

use crate::catalog::AssessmentRecord;

pub const DEFAULT_DENSE_DIMENSION: usize = 256;

const STOP_WORDS: &[&str] = &[
    "an", "and", "are", "as", "at", "be", "by", "can", "for", "from", "has", "have", "in", "is",
    "it", "of", "on", "or", "that", "the", "their", "this", "to", "was", "we", "were", "who",
    "will", "with", "you", "your",
];

/// Which feature strategy backs the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    #[default]
    Lexical,
    Dense,
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Representation::Lexical => f.write_str("lexical"),
            Representation::Dense => f.write_str("dense"),
        }
    }
}

impl std::str::FromStr for Representation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "tfidf" | "tf-idf" => Ok(Self::Lexical),
            "dense" | "hashed" => Ok(Self::Dense),
            other => anyhow::bail!("unknown representation `{other}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureVector {
    /// `(term index, weight)` pairs sorted by term index.
    Sparse(Vec<(u32, f32)>),
    Dense(Vec<f32>),
}

impl FeatureVector {
    pub fn norm(&self) -> f32 {
        match self {
            FeatureVector::Sparse(v) => v.iter().map(|(_, w)| w * w).sum::<f32>().sqrt(),
            FeatureVector::Dense(v) => v.iter().map(|w| w * w).sum::<f32>().sqrt(),
        }
    }

    /// Dot product; `None` when the two vectors use different representations.
    pub fn dot(&self, other: &FeatureVector) -> Option<f32> {
        match (self, other) {
            (FeatureVector::Sparse(a), FeatureVector::Sparse(b)) => {
                let (mut i, mut j, mut acc) = (0usize, 0usize, 0.0f32);
                while i < a.len() && j < b.len() {
                    match a[i].0.cmp(&b[j].0) {
                        std::cmp::Ordering::Less => i += 1,
                        std::cmp::Ordering::Greater => j += 1,
                        std::cmp::Ordering::Equal => {
                            acc += a[i].1 * b[j].1;
                            i += 1;
                            j += 1;
                        }
                    }
                }
                Some(acc)
            }
            (FeatureVector::Dense(a), FeatureVector::Dense(b)) => {
                Some(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
            }
            _ => None,
        }
    }
}

/// Lowercased alphanumeric tokens; `+` and `#` stay attached ("c++", "c#").
/// Single characters and stop words are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| t.chars().count() > 1 && !STOP_WORDS.contains(&t.as_str()))
        .collect()
}

pub trait TextEncoder: Send + Sync + fmt::Debug {
    fn representation(&self) -> Representation;
    fn encode(&self, text: &str) -> FeatureVector;
    /// Number of feature dimensions (vocabulary size for lexical encoders).
    fn dimensions(&self) -> usize;
}

/* ----------------------------
Lexical: TF-IDF
---------------------------- */

#[derive(Debug, Clone)]
pub struct TfIdfEncoder {
    vocab: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfIdfEncoder {
    /// Learn vocabulary and document frequencies from the catalog texts.
    pub fn fit<S: AsRef<str>>(docs: &[S]) -> Self {
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let uniq: BTreeSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in uniq {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let n = docs.len() as f32;
        let mut vocab = HashMap::with_capacity(df.len());
        let mut idf = Vec::with_capacity(df.len());
        for (i, (term, count)) in df.into_iter().enumerate() {
            vocab.insert(term, i as u32);
            idf.push(((1.0 + n) / (1.0 + count as f32)).ln() + 1.0);
        }
        Self { vocab, idf }
    }
}

impl TextEncoder for TfIdfEncoder {
    fn representation(&self) -> Representation {
        Representation::Lexical
    }

    fn encode(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for tok in tokenize(text) {
            if let Some(&idx) = self.vocab.get(&tok) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let mut v: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx as usize]))
            .collect();
        let norm = v.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in v.iter_mut() {
                *w /= norm;
            }
        }
        FeatureVector::Sparse(v)
    }

    fn dimensions(&self) -> usize {
        self.idf.len()
    }
}

/* ----------------------------
Dense: signed feature hashing
---------------------------- */

#[derive(Debug, Clone)]
pub struct HashedEncoder {
    dim: usize,
}

impl HashedEncoder {
    const WORD_WEIGHT: f32 = 1.0;
    const TRIGRAM_WEIGHT: f32 = 0.5;

    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn add(&self, v: &mut [f32], feature: &str, weight: f32) {
        let h = fnv1a(feature.as_bytes());
        let bucket = (h % self.dim as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

impl TextEncoder for HashedEncoder {
    fn representation(&self) -> Representation {
        Representation::Dense
    }

    fn encode(&self, text: &str) -> FeatureVector {
        let mut v = vec![0.0f32; self.dim];
        for tok in tokenize(text) {
            self.add(&mut v, &tok, Self::WORD_WEIGHT);
            let padded: Vec<char> = format!(" {tok} ").chars().collect();
            for w in padded.windows(3) {
                let gram: String = w.iter().collect();
                self.add(&mut v, &format!("#{gram}"), Self::TRIGRAM_WEIGHT);
            }
        }
        let norm = v.iter().map(|w| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|w| *w /= norm);
        }
        FeatureVector::Dense(v)
    }

    fn dimensions(&self) -> usize {
        self.dim
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        h ^= *b as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01b3);
    }
    h
}

/* ----------------------------
Catalog index
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub representation: Representation,
    pub dense_dimension: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            representation: Representation::Lexical,
            dense_dimension: DEFAULT_DENSE_DIMENSION,
        }
    }
}

/// Records paired 1:1 by position with their feature vectors. Immutable once built.
#[derive(Debug)]
pub struct CatalogIndex {
    records: Vec<AssessmentRecord>,
    vectors: Vec<FeatureVector>,
    encoder: Box<dyn TextEncoder>,
}

impl CatalogIndex {
    pub fn build(records: Vec<AssessmentRecord>, opts: IndexOptions) -> Self {
        let started = Instant::now();
        let texts: Vec<String> = records.iter().map(AssessmentRecord::feature_text).collect();

        let encoder: Box<dyn TextEncoder> = match opts.representation {
            Representation::Lexical => Box::new(TfIdfEncoder::fit(&texts)),
            Representation::Dense => Box::new(HashedEncoder::new(opts.dense_dimension)),
        };
        let vectors: Vec<FeatureVector> = texts.iter().map(|t| encoder.encode(t)).collect();

        info!(
            records = records.len(),
            representation = %encoder.representation(),
            dimensions = encoder.dimensions(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feature index built"
        );

        Self {
            records,
            vectors,
            encoder,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    pub fn representation(&self) -> Representation {
        self.encoder.representation()
    }

    pub fn dimensions(&self) -> usize {
        self.encoder.dimensions()
    }

    pub fn encode_query(&self, query: &str) -> FeatureVector {
        self.encoder.encode(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_catalog;

    #[test]
    fn tokenizer_keeps_language_names_and_drops_noise() {
        assert_eq!(
            tokenize("C++ and C# developer, who knows SQL!"),
            vec!["c++", "c#", "developer", "knows", "sql"]
        );
        assert!(tokenize("a I ... the").is_empty());
    }

    #[test]
    fn tfidf_vectors_are_unit_length_and_ignore_unknown_terms() {
        let enc = TfIdfEncoder::fit(&["java coding test", "personality questionnaire"]);
        assert_eq!(enc.dimensions(), 5);

        let v = enc.encode("java java questionnaire");
        assert!((v.norm() - 1.0).abs() < 1e-5);

        let empty = enc.encode("kubernetes terraform");
        assert_eq!(empty, FeatureVector::Sparse(Vec::new()));
        assert_eq!(empty.norm(), 0.0);
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let enc = TfIdfEncoder::fit(&["java test", "python test", "sql test"]);
        let FeatureVector::Sparse(v) = enc.encode("java test") else {
            panic!("lexical encoder must produce sparse vectors");
        };
        let java = enc.vocab["java"];
        let test = enc.vocab["test"];
        let w = |idx: u32| v.iter().find(|(i, _)| *i == idx).map(|(_, w)| *w).unwrap();
        assert!(w(java) > w(test));
    }

    #[test]
    fn hashed_vectors_have_fixed_dimension() {
        let enc = HashedEncoder::new(64);
        let FeatureVector::Dense(v) = enc.encode("Python data analysis") else {
            panic!("hashed encoder must produce dense vectors");
        };
        assert_eq!(v.len(), 64);
        assert_eq!(enc.encode(""), FeatureVector::Dense(vec![0.0; 64]));
        // deterministic across calls
        assert_eq!(enc.encode("python"), enc.encode("python"));
    }

    #[test]
    fn index_pairs_records_and_vectors_by_position() {
        for representation in [Representation::Lexical, Representation::Dense] {
            let idx = CatalogIndex::build(
                seed_catalog(),
                IndexOptions {
                    representation,
                    dense_dimension: 128,
                },
            );
            assert_eq!(idx.records().len(), idx.vectors().len());
            assert_eq!(idx.representation(), representation);
            for (rec, vec) in idx.records().iter().zip(idx.vectors()) {
                assert_eq!(&idx.encode_query(&rec.feature_text()), vec);
            }
        }
    }

    #[test]
    fn empty_catalog_builds_empty_index() {
        let idx = CatalogIndex::build(Vec::new(), IndexOptions::default());
        assert!(idx.is_empty());
        assert_eq!(idx.dimensions(), 0);
    }

    #[test]
    fn mixed_representations_do_not_dot() {
        let a = FeatureVector::Sparse(vec![(0, 1.0)]);
        let b = FeatureVector::Dense(vec![1.0]);
        assert_eq!(a.dot(&b), None);
    }

    #[test]
    fn representation_parses_aliases() {
        assert_eq!("TF-IDF".parse::<Representation>().unwrap(), Representation::Lexical);
        assert_eq!("hashed".parse::<Representation>().unwrap(), Representation::Dense);
        assert!("bert".parse::<Representation>().is_err());
    }
}
