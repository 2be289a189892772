//! Catalog store: persisted file parsing, load-time defaults and fallback.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use assessment_recommender::{
    catalog::{
        load_catalog, load_or_fallback, seed_catalog, FallbackPolicy, YesNo, DEFAULT_DESCRIPTION,
    },
    config::RecommenderConfig,
    error::CatalogError,
    RecommendRequest, Recommender,
};

fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("tmp file");
    f.write_all(contents.as_bytes()).expect("write tmp");
    f
}

fn shipped_catalog() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/assessments.json")
}

#[test]
fn shipped_catalog_parses_with_aliases_and_defaults() {
    let records = load_catalog(&shipped_catalog()).expect("shipped catalog");
    assert_eq!(records.len(), 12);

    let java = &records[0];
    assert!(java.identity.starts_with("https://www.shl.com/"));
    assert_eq!(java.categories, vec!["Knowledge & Skills".to_string()]);
    assert_eq!(java.duration, 13, "\"13 minutes\" should parse as 13");

    let sql = records.iter().find(|r| r.name.starts_with("SQL Server")).unwrap();
    assert!(sql.description.contains("indexing & database"), "entities decoded");
    assert_eq!(sql.min_experience, 1);

    let global = records.last().unwrap();
    assert_eq!(
        global.categories,
        vec![
            "Knowledge & Skills".to_string(),
            "Biodata & Situational Judgement".to_string()
        ],
        "categories inferred when test_type is absent"
    );
}

#[test]
fn sparse_records_get_load_time_defaults() {
    let f = write_tmp(
        r#"[
            {"id": "bare"},
            {"url": "u2", "name": "  Numerical   Reasoning ", "duration": "about 25 min",
             "adaptive_support": true, "remote_support": "no"},
            {"identity": "   "}
        ]"#,
    );
    let records = load_catalog(f.path()).expect("parse");
    assert_eq!(records.len(), 2, "blank identity dropped");

    let bare = &records[0];
    assert_eq!(bare.name, "bare");
    assert_eq!(bare.description, DEFAULT_DESCRIPTION);
    assert_eq!(bare.categories, vec!["General".to_string()]);
    assert_eq!((bare.duration, bare.min_experience), (0, 0));
    assert_eq!(bare.adaptive_support, YesNo::No);
    assert_eq!(bare.remote_support, YesNo::Yes);

    let num = &records[1];
    assert_eq!(num.name, "Numerical Reasoning");
    assert_eq!(num.duration, 25);
    assert_eq!(num.adaptive_support, YesNo::Yes);
    assert_eq!(num.remote_support, YesNo::No);
    assert_eq!(num.categories, vec!["Ability & Aptitude".to_string()]);
}

#[test]
fn records_with_several_identity_aliases_keep_the_catalog() {
    let f = write_tmp(
        r#"[
            {"url": "https://x/java", "id": "java-1", "name": "Java"},
            {"id": "only-id", "identity": "primary", "name": "Primary"}
        ]"#,
    );
    let records = load_catalog(f.path()).expect("aliases must not reject the file");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].identity, "https://x/java");
    assert_eq!(records[1].identity, "primary");
}

#[test]
fn categories_win_over_test_type_when_both_are_present() {
    let f = write_tmp(
        r#"[{"url": "u1", "name": "OPQ", "categories": ["Personality & Behavior"],
             "test_type": ["Knowledge & Skills"]}]"#,
    );
    let records = load_catalog(f.path()).expect("both category fields must parse");
    assert_eq!(records[0].categories, vec!["Personality & Behavior".to_string()]);
}

#[test]
fn one_bad_record_does_not_discard_the_rest() {
    let f = write_tmp(
        r#"[
            {"name": "No identity at all"},
            {"url": "u-ok", "name": "SQL Server"},
            "not an object",
            {"url": "u-bad", "duration": {"nested": true}}
        ]"#,
    );
    let records = load_or_fallback(f.path(), FallbackPolicy::Builtin);
    let ids: Vec<&str> = records.iter().map(|r| r.identity.as_str()).collect();
    assert_eq!(ids, vec!["u-ok"], "seed catalog must not replace a readable file");
}

#[test]
fn missing_and_malformed_files_are_typed_errors() {
    let missing = Path::new("definitely/not/here.json");
    assert!(matches!(
        load_catalog(missing),
        Err(CatalogError::Unavailable { .. })
    ));

    let f = write_tmp("{ not json");
    assert!(matches!(
        load_catalog(f.path()),
        Err(CatalogError::Malformed { .. })
    ));
}

#[test]
fn fallback_policy_decides_what_is_served() {
    let missing = Path::new("definitely/not/here.json");
    assert_eq!(
        load_or_fallback(missing, FallbackPolicy::Builtin),
        seed_catalog()
    );
    assert!(load_or_fallback(missing, FallbackPolicy::Empty).is_empty());

    let f = write_tmp("[]");
    assert!(load_or_fallback(f.path(), FallbackPolicy::Builtin).is_empty());
}

#[test]
fn recommender_from_config_serves_seed_when_catalog_missing() {
    let mut cfg = RecommenderConfig::default();
    cfg.catalog.path = PathBuf::from("definitely/not/here.json");
    let e = Recommender::from_config(&cfg);
    assert_eq!(e.index().len(), seed_catalog().len());
    assert!(!e.recommend(&RecommendRequest::new("java")).is_empty());
}

#[test]
fn shipped_catalog_answers_the_evaluation_queries() {
    let mut cfg = RecommenderConfig::default();
    cfg.catalog.path = shipped_catalog();
    let e = Recommender::from_config(&cfg);

    let out = e.recommend(&RecommendRequest::new(
        "Need a Java developer who is good in collaborating with external teams.",
    ));
    assert!(out.iter().any(|i| i.name.contains("Java")));
    assert!(out
        .iter()
        .any(|i| i.test_type.iter().any(|t| t == "Personality & Behavior")));
}
