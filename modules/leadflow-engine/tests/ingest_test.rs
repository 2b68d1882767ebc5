//! Batch ingestion behavior against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use leadflow_common::{IngestScope, LeadFlowError};
use leadflow_engine::{
    ingest_batch, ingest_validation_results, EmailDiscoveryAdapter, EmployeeAdapter,
    MemoryStore, ProfileAdapter,
};
use serde_json::{json, Value};

fn scope() -> IngestScope {
    IngestScope::new(7, 42).with_job_id("job-123")
}

fn profile_records() -> Vec<Value> {
    vec![
        json!({
            "email": "jane@acme.com",
            "emailCertainty": "sure",
            "firstName": "Jane",
            "lastName": "Doe",
            "jobTitle": "VP Engineering",
            "company": { "name": "Acme", "websiteUrl": "https://www.acme.com" }
        }),
        json!({
            "email": "louis@contoso.io",
            "emailCertainty": "ultra_sure",
            "firstName": "Louis",
            "lastName": "Pasteur",
            "city": "Lille",
            "company": { "name": "Contoso", "domain": "contoso.io" }
        }),
    ]
}

#[tokio::test]
async fn first_run_creates_second_run_enriches() {
    let store = Arc::new(MemoryStore::new());
    let records = profile_records();

    let first = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(first.created, 2);
    assert_eq!(first.errors, 0);
    assert_eq!(store.lead_count(), 2);
    assert_eq!(store.company_count(), 2);

    let second = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.enriched, 2);
    assert_eq!(second.errors, 0);

    // Idempotent: no new rows, no duplicate memberships.
    assert_eq!(store.lead_count(), 2);
    assert_eq!(store.company_count(), 2);
    assert_eq!(store.memberships().len(), 2);
}

#[tokio::test]
async fn summary_counts_cover_every_record() {
    let store = MemoryStore::new();
    let records = profile_records();

    let summary = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(summary.total() as usize, records.len());
}

#[tokio::test]
async fn certainty_upgrade_merges_without_touching_equal_email() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![
        json!({
            "email": "jane@acme.com",
            "emailCertainty": "sure",
            "firstName": "Jane",
            "lastName": "Doe"
        }),
        json!({
            "email": "jane@acme.com",
            "emailCertainty": "ultra_sure",
            "linkedinUrl": "https://linkedin.com/in/janedoe"
        }),
    ];

    let summary = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.enriched, 1);
    assert_eq!(store.lead_count(), 1);

    let lead = store.lead_by_email("jane@acme.com").unwrap();
    assert_eq!(lead.email_certainty.as_deref(), Some("ultra_sure"));
    assert_eq!(
        lead.linkedin_url.as_deref(),
        Some("https://linkedin.com/in/janedoe")
    );
    // First-run fields survive.
    assert_eq!(lead.first_name.as_deref(), Some("Jane"));
}

#[tokio::test]
async fn lower_certainty_never_downgrades_email() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![
        json!({ "email": "a@x.com", "emailCertainty": "ultra_sure", "firstName": "A", "lastName": "B" }),
        json!({ "email": "a@x.com", "emailCertainty": "sure", "linkedinUrl": "https://linkedin.com/in/ab" }),
    ];

    ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();

    let lead = store.lead_by_email("a@x.com").unwrap();
    assert_eq!(lead.email.as_deref(), Some("a@x.com"));
    assert_eq!(lead.email_certainty.as_deref(), Some("ultra_sure"));
    // Non-email fields still fill normally.
    assert_eq!(lead.linkedin_url.as_deref(), Some("https://linkedin.com/in/ab"));
}

#[tokio::test]
async fn same_company_across_sources_creates_one_row() {
    let store = Arc::new(MemoryStore::new());

    let employee = vec![json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "company": { "name": "Acme", "domain": "acme.com" }
    })];
    ingest_batch(&store, &EmployeeAdapter, &employee, &scope())
        .await
        .unwrap();

    let profile = vec![json!({
        "email": "someone@acme.com",
        "company": { "name": "Acme", "websiteUrl": "https://www.acme.com" }
    })];
    ingest_batch(&store, &ProfileAdapter, &profile, &scope())
        .await
        .unwrap();

    assert_eq!(store.company_count(), 1);
    assert_eq!(store.companies()[0].name, "Acme");
}

#[tokio::test]
async fn malformed_record_counts_as_error_and_batch_continues() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![
        json!("definitely not an object"),
        json!({ "email": "ok@acme.com", "firstName": "Ok", "lastName": "Fine" }),
    ];

    let summary = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.created, 1);
    assert_eq!(store.lead_count(), 1);
}

#[tokio::test]
async fn record_without_any_match_key_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![json!({ "city": "Paris" })];

    let summary = ingest_batch(&store, &ProfileAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.lead_count(), 0);
}

#[tokio::test]
async fn discovery_not_found_is_skipped_never_created() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![
        json!({ "status": "NOT_FOUND", "first_name": "Jane", "last_name": "Doe" }),
        json!({ "status": "FOUND", "email": "jane@acme.com", "confidence": "sure" }),
    ];

    let summary = ingest_batch(&store, &EmailDiscoveryAdapter, &records, &scope())
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(store.lead_count(), 1);
}

#[tokio::test]
async fn validation_unmatched_email_is_skipped_not_error() {
    let store = Arc::new(MemoryStore::new());
    let map: HashMap<String, uuid::Uuid> = HashMap::new();
    let records = vec![json!({ "email": "ghost@nowhere.com", "status": "valid" })];

    let summary = ingest_validation_results(&store, &records, &map, &scope())
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.errors, 0);
    assert_eq!(store.lead_count(), 0);
}

#[tokio::test]
async fn validation_writes_status_and_timestamp() {
    let store = Arc::new(MemoryStore::new());

    let seed = vec![json!({ "email": "jane@acme.com", "firstName": "Jane", "lastName": "Doe" })];
    ingest_batch(&store, &ProfileAdapter, &seed, &scope())
        .await
        .unwrap();
    let lead = store.lead_by_email("jane@acme.com").unwrap();

    let mut map = HashMap::new();
    map.insert("jane@acme.com".to_string(), lead.id);

    let records = vec![json!({ "email": "Jane@Acme.com", "status": "valid" })];
    let summary = ingest_validation_results(&store, &records, &map, &scope())
        .await
        .unwrap();
    assert_eq!(summary.enriched, 1);

    let lead = store.lead_by_email("jane@acme.com").unwrap();
    assert_eq!(lead.email_verification_status.as_deref(), Some("valid"));
    assert!(lead.email_verified_at.is_some());
}

#[tokio::test]
async fn usage_write_failure_never_fails_the_batch() {
    let store = Arc::new(MemoryStore::new());
    store.fail_usage_writes();

    let summary = ingest_batch(&store, &ProfileAdapter, &profile_records(), &scope())
        .await
        .unwrap();
    assert_eq!(summary.created, 2);
    assert_eq!(summary.errors, 0);
    assert!(store.usage().is_empty());
}

#[tokio::test]
async fn usage_rows_tag_source_and_job() {
    let store = Arc::new(MemoryStore::new());
    ingest_batch(&store, &ProfileAdapter, &profile_records(), &scope())
        .await
        .unwrap();

    let usage = store.usage();
    // 2 created companies + 2 created leads.
    assert_eq!(usage.len(), 4);
    assert!(usage.iter().all(|u| u.source_tag == "profile_scraper"));
    assert!(usage.iter().all(|u| u.source_job_id.as_deref() == Some("job-123")));
    assert!(usage.iter().all(|u| u.owner_user_id == 7));
}

#[tokio::test]
async fn invalid_scope_aborts_before_the_loop() {
    let store = MemoryStore::new();
    let err = ingest_batch(&store, &ProfileAdapter, &profile_records(), &IngestScope::new(0, 42))
        .await
        .unwrap_err();
    assert!(matches!(err, LeadFlowError::Validation(_)));
    assert_eq!(store.lead_count(), 0);
}
