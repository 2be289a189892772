// src/telemetry.rs
//! Tracing setup and log-safe query identifiers.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "assessment_recommender=info,tower_http=info,warn";

/// Install the global subscriber. `RUST_LOG` overrides the filter,
/// `LOG_FORMAT=json` switches to JSON lines. A subscriber installed earlier
/// (e.g. by the deployment runtime) wins; this is then a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Short, stable id for a query. Raw query text is never logged.
pub fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_hash_is_short_stable_and_distinct() {
        let a = anon_hash("java developer");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("java developer"));
        assert_ne!(a, anon_hash("java developers"));
    }
}
