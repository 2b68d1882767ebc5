//! Best-effort usage audit writes — a nudge for billing/analytics, not a
//! delivery guarantee. A failed write must never fail the ingestion.

use tracing::warn;

use crate::store::{LeadStore, UsageRecord};

pub async fn record_best_effort<S: LeadStore + ?Sized>(store: &S, usage: UsageRecord) {
    if let Err(e) = store.record_usage(&usage).await {
        warn!(
            error = %e,
            entity_type = usage.entity_type.as_str(),
            entity_id = %usage.entity_id,
            source_tag = %usage.source_tag,
            "usage audit write failed; continuing"
        );
    }
}
