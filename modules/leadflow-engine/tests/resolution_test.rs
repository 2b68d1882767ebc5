//! Resolver contracts: company find-or-create, lead lookup precedence,
//! and the collection scoping rules.

use std::sync::Arc;

use leadflow_common::{CompanyFragment, IngestScope, PersonFragment};
use leadflow_engine::{
    ingest_batch, resolve_existing_lead, resolve_or_create_company, EmployeeAdapter,
    MemoryStore, ProfileAdapter,
};
use serde_json::json;

fn scope() -> IngestScope {
    IngestScope::new(7, 42)
}

#[tokio::test]
async fn company_without_name_resolves_to_none_and_writes_nothing() {
    let store = MemoryStore::new();
    let fragment = CompanyFragment {
        domain: Some("acme.com".into()),
        website: Some("https://acme.com".into()),
        ..Default::default()
    };

    let resolved = resolve_or_create_company(&store, &fragment).await.unwrap();
    assert!(resolved.is_none());
    assert_eq!(store.company_count(), 0);
}

#[tokio::test]
async fn company_matches_existing_by_domain_despite_name_variant() {
    let store = MemoryStore::new();

    let first = CompanyFragment {
        name: Some("Acme".into()),
        domain: Some("acme.com".into()),
        ..Default::default()
    };
    let created = resolve_or_create_company(&store, &first)
        .await
        .unwrap()
        .unwrap();
    assert!(created.created);

    // Same domain, different rendering of the name: must not create.
    let second = CompanyFragment {
        name: Some("Acme Inc.".into()),
        website: Some("https://www.acme.com/jobs".into()),
        ..Default::default()
    };
    let resolved = resolve_or_create_company(&store, &second)
        .await
        .unwrap()
        .unwrap();
    assert!(!resolved.created);
    assert_eq!(resolved.id, created.id);
    assert_eq!(store.company_count(), 1);
}

#[tokio::test]
async fn company_domain_derived_from_website_when_absent() {
    let store = MemoryStore::new();
    let fragment = CompanyFragment {
        name: Some("Acme".into()),
        website: Some("https://www.Acme.com/about".into()),
        ..Default::default()
    };

    resolve_or_create_company(&store, &fragment).await.unwrap();
    assert_eq!(store.companies()[0].domain.as_deref(), Some("acme.com"));
}

#[tokio::test]
async fn lead_identity_lookup_is_scoped_per_collection() {
    let store = Arc::new(MemoryStore::new());
    let record = vec![json!({
        "email": "jane@acme.com",
        "firstName": "Jane",
        "lastName": "Doe"
    })];

    ingest_batch(&store, &ProfileAdapter, &record, &IngestScope::new(7, 1))
        .await
        .unwrap();
    let second = ingest_batch(&store, &ProfileAdapter, &record, &IngestScope::new(7, 2))
        .await
        .unwrap();

    // Same person, different collection: a second Lead by design.
    assert_eq!(second.created, 1);
    assert_eq!(store.lead_count(), 2);
}

#[tokio::test]
async fn lead_matches_by_linkedin_when_email_differs() {
    let store = Arc::new(MemoryStore::new());
    let records = vec![
        json!({
            "email": "jane@acme.com",
            "emailCertainty": "sure",
            "linkedinUrl": "https://linkedin.com/in/janedoe",
            "firstName": "Jane",
            "lastName": "Doe"
        }),
        json!({
            "email": "jane.doe@acme.com",
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

    // Higher certainty: the email upgraded through the ranked rule.
    let lead = store.leads()[0].clone();
    assert_eq!(lead.email.as_deref(), Some("jane.doe@acme.com"));
    assert_eq!(lead.email_certainty.as_deref(), Some("ultra_sure"));
}

#[tokio::test]
async fn name_fallback_matches_same_company_only() {
    let store = Arc::new(MemoryStore::new());

    let first = vec![json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "company": { "name": "Acme", "domain": "acme.com" }
    })];
    ingest_batch(&store, &EmployeeAdapter, &first, &scope())
        .await
        .unwrap();

    // Same name, same company: enriched, not duplicated.
    let again = vec![json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "job_title": "CTO",
        "company": { "name": "Acme", "domain": "acme.com" }
    })];
    let summary = ingest_batch(&store, &EmployeeAdapter, &again, &scope())
        .await
        .unwrap();
    assert_eq!(summary.enriched, 1);
    assert_eq!(store.lead_count(), 1);
    assert_eq!(store.leads()[0].position.as_deref(), Some("CTO"));

    // Same name, different company: a second Lead (current behavior).
    let elsewhere = vec![json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "company": { "name": "Globex", "domain": "globex.com" }
    })];
    let summary = ingest_batch(&store, &EmployeeAdapter, &elsewhere, &scope())
        .await
        .unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(store.lead_count(), 2);
}

#[tokio::test]
async fn profile_sources_do_not_match_by_name() {
    let store = Arc::new(MemoryStore::new());

    let seed = vec![json!({
        "email": "jane@acme.com",
        "firstName": "Jane",
        "lastName": "Doe"
    })];
    ingest_batch(&store, &ProfileAdapter, &seed, &scope())
        .await
        .unwrap();

    // Name fallback is off for profile records: a keyless same-name record
    // must not silently merge into the wrong person.
    let fragment = PersonFragment {
        first_name: Some("Jane".into()),
        last_name: Some("Doe".into()),
        ..Default::default()
    };
    let found = resolve_existing_lead(&store, &scope(), &fragment, None, false)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn owner_scoping_isolates_users() {
    let store = Arc::new(MemoryStore::new());
    let record = vec![json!({ "email": "jane@acme.com", "firstName": "Jane", "lastName": "Doe" })];

    ingest_batch(&store, &ProfileAdapter, &record, &IngestScope::new(7, 42))
        .await
        .unwrap();
    let other_user = ingest_batch(&store, &ProfileAdapter, &record, &IngestScope::new(8, 42))
        .await
        .unwrap();

    assert_eq!(other_user.created, 1);
    assert_eq!(store.lead_count(), 2);
}
