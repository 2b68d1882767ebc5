//! Lead resolution, scoped to one {owner, collection}.

use anyhow::Result;
use leadflow_common::{IngestScope, PersonFragment};
use uuid::Uuid;

use crate::store::{LeadRow, LeadStore};

/// Find the Lead an incoming fragment refers to, if any.
///
/// Lookup strategy, first non-empty result wins:
/// 1. email OR linkedin_url, on whichever keys are present;
/// 2. (name-based ingestors only) first+last name, constrained to
///    `company_id` when one resolved.
///
/// A same-named person at a different company deliberately does not match
/// on the fallback path and will surface as a second Lead.
pub async fn resolve_existing_lead<S: LeadStore + ?Sized>(
    store: &S,
    scope: &IngestScope,
    fragment: &PersonFragment,
    company_id: Option<Uuid>,
    name_fallback: bool,
) -> Result<Option<LeadRow>> {
    if fragment.has_identity_key() {
        let found = store
            .find_lead_by_identity(
                scope,
                fragment.email.as_deref(),
                fragment.linkedin_url.as_deref(),
            )
            .await?;
        if found.is_some() {
            return Ok(found);
        }
    }

    if name_fallback && fragment.has_full_name_keys() {
        let (first, last) = (
            fragment.first_name.as_deref().unwrap_or_default(),
            fragment.last_name.as_deref().unwrap_or_default(),
        );
        return store
            .find_lead_by_name(scope, first, last, company_id)
            .await;
    }

    Ok(None)
}
