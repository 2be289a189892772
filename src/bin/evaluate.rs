//! Mean Recall@10 against a running recommender API.
//!
//! `API_URL` points at the `/recommend` endpoint (default localhost:8000),
//! `EVAL_CASES_PATH` at a JSON array of `{query, expected_keywords}` cases.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use assessment_recommender::{
    api::RecommendationResp,
    eval::{self, EvalCase, DEFAULT_CASES_PATH, DEFAULT_K},
    telemetry,
};
use reqwest::Client;
use tracing::{error, info};

const DEFAULT_API_URL: &str = "http://localhost:8000/recommend";

async fn run_case(client: &Client, url: &str, case: &EvalCase) -> Result<f64> {
    let resp: RecommendationResp = client
        .post(url)
        .json(&serde_json::json!({ "query": case.query }))
        .send()
        .await
        .context("recommend post")?
        .error_for_status()
        .context("recommend non-2xx")?
        .json()
        .await
        .context("recommend body")?;
    Ok(eval::recall_at_k(
        &resp.recommended_assessments,
        &case.expected_keywords,
        DEFAULT_K,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let url = std::env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let cases_path = std::env::var("EVAL_CASES_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CASES_PATH));
    let cases = eval::load_cases_or_default(&cases_path)?;
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("http client")?;

    info!(cases = cases.len(), %url, "starting evaluation (mean Recall@{DEFAULT_K})");
    let mut recalls = Vec::with_capacity(cases.len());
    for case in &cases {
        let preview: String = case.query.chars().take(30).collect();
        match run_case(&client, &url, case).await {
            Ok(recall) => {
                info!(query = %preview, recall = %format!("{recall:.2}"), "case evaluated");
                recalls.push(recall);
            }
            Err(e) => error!(query = %preview, error = ?e, "case failed"),
        }
    }

    let mean = eval::mean_recall(&recalls, cases.len());
    info!(mean = %format!("{mean:.2}"), "final mean Recall@{DEFAULT_K}");
    println!("mean_recall@{DEFAULT_K}={mean:.4}");
    Ok(())
}
