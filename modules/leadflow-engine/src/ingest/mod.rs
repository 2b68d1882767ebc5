//! Batch ingestion: one shared resolve/merge loop, one small adapter per
//! upstream shape. New sources require an adapter, never engine changes.

mod csv;
mod email_discovery;
mod email_validation;
mod employees;
mod profile;

pub use csv::CsvAdapter;
pub use email_discovery::EmailDiscoveryAdapter;
pub use email_validation::ingest_validation_results;
pub use employees::EmployeeAdapter;
pub use profile::ProfileAdapter;

use anyhow::Result;
use leadflow_common::{BatchSummary, CompanyFragment, IngestScope, LeadFlowError, PersonFragment};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::merge;
use crate::resolve::{resolve_existing_lead, resolve_or_create_company};
use crate::store::{EntityType, LeadStore, UsageRecord};
use crate::usage;

/// Both fragments extracted from one upstream record.
#[derive(Debug, Clone, Default)]
pub struct RecordFragments {
    pub person: PersonFragment,
    pub company: CompanyFragment,
}

/// Outcome of adapting one raw record.
pub enum Adapted {
    Record(Box<RecordFragments>),
    /// Record carries nothing usable (e.g. a NOT_FOUND discovery result).
    Skip(String),
}

/// Adapts one source-specific record shape into the common fragments.
pub trait SourceAdapter: Send + Sync {
    /// Tag written into usage audit rows for this source.
    fn source_tag(&self) -> &'static str;

    /// Map a raw upstream record to fragments, or a skip reason.
    /// Errors here count as record errors, not skips.
    fn adapt(&self, raw: &Value) -> Result<Adapted>;

    /// Whether this source may match leads by first+last name (+company)
    /// when no email/linkedin key is present.
    fn name_fallback(&self) -> bool {
        false
    }
}

enum RecordOutcome {
    Created,
    Enriched,
    Skipped,
}

/// Run one batch of raw upstream records through resolution and merging.
///
/// Records are processed strictly sequentially so the resolve step for
/// record N+1 observes the writes of record N — this is what keeps a batch
/// duplicate-free. Per-record failures are logged with the offending
/// record, counted, and never abort the batch.
pub async fn ingest_batch<S: LeadStore, A: SourceAdapter>(
    store: &S,
    adapter: &A,
    records: &[Value],
    scope: &IngestScope,
) -> Result<BatchSummary, LeadFlowError> {
    validate_scope(scope)?;

    let mut summary = BatchSummary::default();

    for raw in records {
        match process_record(store, adapter, raw, scope).await {
            Ok(RecordOutcome::Created) => summary.created += 1,
            Ok(RecordOutcome::Enriched) => summary.enriched += 1,
            Ok(RecordOutcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                warn!(
                    error = %e,
                    source = adapter.source_tag(),
                    record = %raw,
                    "record failed; continuing batch"
                );
                summary.errors += 1;
            }
        }
    }

    info!(
        source = adapter.source_tag(),
        owner_user_id = scope.owner_user_id,
        collection_id = scope.collection_id,
        created = summary.created,
        enriched = summary.enriched,
        skipped = summary.skipped,
        errors = summary.errors,
        "batch ingested"
    );

    Ok(summary)
}

async fn process_record<S: LeadStore, A: SourceAdapter>(
    store: &S,
    adapter: &A,
    raw: &Value,
    scope: &IngestScope,
) -> Result<RecordOutcome> {
    let fragments = match adapter.adapt(raw)? {
        Adapted::Record(fragments) => fragments,
        Adapted::Skip(reason) => {
            debug!(source = adapter.source_tag(), reason = %reason, "record skipped");
            return Ok(RecordOutcome::Skipped);
        }
    };

    let company = resolve_or_create_company(store, &fragments.company).await?;
    if let Some(resolution) = &company {
        if resolution.created {
            usage::record_best_effort(
                store,
                UsageRecord::touched(
                    EntityType::Company,
                    resolution.id,
                    scope,
                    adapter.source_tag(),
                ),
            )
            .await;
        }
    }
    let company_id = company.map(|c| c.id);

    let person = &fragments.person;
    let existing = resolve_existing_lead(
        store,
        scope,
        person,
        company_id,
        adapter.name_fallback(),
    )
    .await?;

    let outcome = match existing {
        Some(lead) => {
            match merge::build_patch(&lead, person, company_id) {
                Some(patch) => store.update_lead(lead.id, &patch).await?,
                None => debug!(lead_id = %lead.id, "nothing to merge, skipping write"),
            }
            usage::record_best_effort(
                store,
                UsageRecord::touched(EntityType::Lead, lead.id, scope, adapter.source_tag()),
            )
            .await;
            RecordOutcome::Enriched
        }
        None => {
            // A fragment with no match key at all could never be resolved
            // on a later pass; creating it would guarantee duplicates.
            if !person.has_identity_key() && !person.has_full_name_keys() {
                debug!(source = adapter.source_tag(), "no usable match key, skipping");
                return Ok(RecordOutcome::Skipped);
            }
            let lead = store.insert_lead(scope, person, company_id).await?;
            store.link_membership(lead.id, scope.collection_id).await?;
            usage::record_best_effort(
                store,
                UsageRecord::touched(EntityType::Lead, lead.id, scope, adapter.source_tag()),
            )
            .await;
            RecordOutcome::Created
        }
    };

    Ok(outcome)
}

/// Phone fields arrive as a real JSON array, a stringified array, or a
/// single number in a string.
pub(crate) fn phone_list(value: &Value) -> Vec<String> {
    string_values(value)
}

/// Tag-style fields (specialities) share the same loose encodings.
pub(crate) fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .filter_map(leadflow_common::normalize::non_empty)
            .collect(),
        Value::String(s) => leadflow_common::normalize::string_list(s).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn validate_scope(scope: &IngestScope) -> Result<(), LeadFlowError> {
    if scope.owner_user_id <= 0 {
        return Err(LeadFlowError::Validation(format!(
            "invalid owner_user_id: {}",
            scope.owner_user_id
        )));
    }
    if scope.collection_id <= 0 {
        return Err(LeadFlowError::Validation(format!(
            "invalid collection_id: {}",
            scope.collection_id
        )));
    }
    Ok(())
}
