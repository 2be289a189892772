// src/lib.rs
// Public library surface for the server binary, the evaluation tool and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod experience;
pub mod metrics;
pub mod telemetry;

// Ranking pipeline (index, scoring, filter, rules, select, format)
pub mod filter;
pub mod format;
pub mod index;
pub mod rules;
pub mod scoring;
pub mod select;

// Offline Recall@K evaluation
pub mod eval;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::engine::{RecommendRequest, Recommender};
pub use crate::format::RecommendedItem;
