//! Email-validation job results. Merge-only: the caller pre-builds an
//! email → lead map for the batch, and results for unknown emails are
//! skipped. There is no create path here at all.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use leadflow_common::{normalize, BatchSummary, IngestScope, LeadFlowError};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::{EntityType, LeadPatch, LeadStore, UsageRecord};
use crate::usage;

const SOURCE_TAG: &str = "email_validation";

#[derive(Debug, Default, Deserialize)]
struct RawValidation {
    #[serde(default, alias = "email_address")]
    email: Option<String>,
    #[serde(default, alias = "result", alias = "verification_status")]
    status: Option<String>,
    #[serde(default, alias = "checked_at", alias = "validated_at")]
    verified_at: Option<DateTime<Utc>>,
}

/// Apply validation results to already-known leads.
pub async fn ingest_validation_results<S: LeadStore>(
    store: &S,
    records: &[Value],
    email_to_lead: &HashMap<String, Uuid>,
    scope: &IngestScope,
) -> Result<BatchSummary, LeadFlowError> {
    if scope.owner_user_id <= 0 {
        return Err(LeadFlowError::Validation(format!(
            "invalid owner_user_id: {}",
            scope.owner_user_id
        )));
    }

    let mut summary = BatchSummary::default();

    for raw in records {
        match apply_result(store, raw, email_to_lead, scope).await {
            Ok(true) => summary.enriched += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                warn!(error = %e, record = %raw, "validation result failed; continuing batch");
                summary.errors += 1;
            }
        }
    }

    info!(
        source = SOURCE_TAG,
        owner_user_id = scope.owner_user_id,
        enriched = summary.enriched,
        skipped = summary.skipped,
        errors = summary.errors,
        "validation batch ingested"
    );

    Ok(summary)
}

/// Ok(true) = lead updated, Ok(false) = skipped.
async fn apply_result<S: LeadStore>(
    store: &S,
    raw: &Value,
    email_to_lead: &HashMap<String, Uuid>,
    scope: &IngestScope,
) -> Result<bool> {
    let record: RawValidation =
        serde_json::from_value(raw.clone()).context("validation record shape")?;

    let Some(email) = record.email.as_deref().and_then(normalize::email) else {
        debug!("validation result without email, skipping");
        return Ok(false);
    };
    let Some(status) = record.status.as_deref().and_then(normalize::non_empty) else {
        debug!(email = %email, "validation result without status, skipping");
        return Ok(false);
    };
    let Some(&lead_id) = email_to_lead.get(&email) else {
        debug!(email = %email, "no lead on file for validated email, skipping");
        return Ok(false);
    };

    let patch = LeadPatch {
        email_verification_status: Some(status),
        email_verified_at: Some(record.verified_at.unwrap_or_else(Utc::now)),
        ..Default::default()
    };
    store.update_lead(lead_id, &patch).await?;

    usage::record_best_effort(
        store,
        UsageRecord::touched(EntityType::Lead, lead_id, scope, SOURCE_TAG),
    )
    .await;

    Ok(true)
}
