//! Company resolution: at most one Company per {domain|website|name}
//! identity at the moment a lookup runs, enforced by resolve-before-create.

use anyhow::Result;
use leadflow_common::{normalize, CompanyFragment};
use tracing::debug;
use uuid::Uuid;

use crate::store::{CompanyLookup, LeadStore};

#[derive(Debug, Clone, Copy)]
pub struct CompanyResolution {
    pub id: Uuid,
    /// True when this call inserted the row.
    pub created: bool,
}

/// Resolve an organization fragment to an existing Company or create one.
///
/// A fragment with no usable name resolves to `None` and writes nothing —
/// a Lead may exist without a Company. Exactly 0 or 1 row insert per call.
pub async fn resolve_or_create_company<S: LeadStore + ?Sized>(
    store: &S,
    fragment: &CompanyFragment,
) -> Result<Option<CompanyResolution>> {
    if !fragment.is_resolvable() {
        return Ok(None);
    }

    // Fall back to the website host when the source carried no domain field.
    let domain = fragment
        .domain
        .clone()
        .or_else(|| fragment.website.as_deref().and_then(normalize::extract_domain));

    let lookup = CompanyLookup {
        name: fragment.name.clone(),
        domain: domain.clone(),
        website: fragment.website.clone(),
    };

    if let Some(existing) = store.find_company(&lookup).await? {
        return Ok(Some(CompanyResolution {
            id: existing.id,
            created: false,
        }));
    }

    let mut to_insert = fragment.clone();
    to_insert.domain = domain;
    let row = store.insert_company(&to_insert).await?;
    debug!(company_id = %row.id, name = %row.name, "created company");

    Ok(Some(CompanyResolution {
        id: row.id,
        created: true,
    }))
}
