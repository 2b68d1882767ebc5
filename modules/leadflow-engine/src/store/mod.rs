//! The store seam.
//!
//! `LeadStore` is implemented by `PgStore` (production — Postgres) and
//! `MemoryStore` (tests — no database required). Also implemented for
//! `Arc<S>` so tests can share the store for assertions.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use leadflow_common::{CompanyFragment, IngestScope, PersonFragment};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub linkedin_url: Option<String>,
    pub founded_year: Option<i32>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub description: Option<String>,
    pub specialities: Vec<String>,
    pub technologies: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub owner_user_id: i64,
    pub company_id: Option<Uuid>,

    pub email: Option<String>,
    pub email_certainty: Option<String>,
    pub email_verification_status: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,

    pub linkedin_url: Option<String>,
    pub personal_email: Option<String>,
    pub external_person_id: Option<String>,
    pub public_identifier: Option<String>,

    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub seniority: Option<String>,
    pub functional_area: Option<String>,

    pub phone_numbers: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Lookup / update shapes
// ---------------------------------------------------------------------------

/// Company lookup predicate: OR of the clauses whose value is present.
/// First match in store default order wins.
#[derive(Debug, Clone, Default)]
pub struct CompanyLookup {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub website: Option<String>,
}

impl CompanyLookup {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.domain.is_none() && self.website.is_none()
    }
}

/// Field-level update set produced by the merge policy. `None` means
/// "leave the stored value alone" — a patch never clears anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadPatch {
    pub email: Option<String>,
    pub email_certainty: Option<String>,
    pub email_verification_status: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,

    pub linkedin_url: Option<String>,
    pub personal_email: Option<String>,
    pub external_person_id: Option<String>,
    pub public_identifier: Option<String>,

    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub seniority: Option<String>,
    pub functional_area: Option<String>,

    pub phone_numbers: Option<Vec<String>>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,

    pub company_id: Option<Uuid>,
}

impl LeadPatch {
    /// True when applying the patch would change zero columns.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ---------------------------------------------------------------------------
// Usage audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Lead,
    Company,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Lead => "lead",
            EntityType::Company => "company",
        }
    }
}

/// Append-only audit record: which entity was touched by which source/job.
/// Observational only — never required for resolution correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub source_tag: String,
    pub source_job_id: Option<String>,
    pub source_scraper_id: Option<i64>,
    pub succeeded: bool,
    pub item_count: i32,
    pub config_snapshot: Option<serde_json::Value>,
    pub owner_user_id: i64,
}

impl UsageRecord {
    pub fn touched(entity_type: EntityType, entity_id: Uuid, scope: &IngestScope, tag: &str) -> Self {
        Self {
            entity_type,
            entity_id,
            source_tag: tag.to_string(),
            source_job_id: scope.source_job_id.clone(),
            source_scraper_id: scope.source_scraper_id,
            succeeded: true,
            item_count: 1,
            config_snapshot: None,
            owner_user_id: scope.owner_user_id,
        }
    }
}

// ---------------------------------------------------------------------------
// LeadStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Single lookup over the OR'd identity clauses. At most one row.
    async fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<CompanyRow>>;

    /// Insert a company populated from every available fragment field.
    async fn insert_company(&self, fragment: &CompanyFragment) -> Result<CompanyRow>;

    /// Exact-key lead lookup scoped to {owner, collection}: email OR
    /// linkedin_url, matching on whichever keys are present.
    async fn find_lead_by_identity(
        &self,
        scope: &IngestScope,
        email: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Result<Option<LeadRow>>;

    /// Name-based fallback lookup, additionally constrained to `company_id`
    /// when one resolved.
    async fn find_lead_by_name(
        &self,
        scope: &IngestScope,
        first_name: &str,
        last_name: &str,
        company_id: Option<Uuid>,
    ) -> Result<Option<LeadRow>>;

    /// Insert a lead populated from every available fragment field.
    /// Collection membership is linked separately.
    async fn insert_lead(
        &self,
        scope: &IngestScope,
        fragment: &PersonFragment,
        company_id: Option<Uuid>,
    ) -> Result<LeadRow>;

    /// Apply a non-empty merge patch. Only the patch's `Some` columns change.
    async fn update_lead(&self, id: Uuid, patch: &LeadPatch) -> Result<()>;

    /// Attach a lead to a collection. No-op when the pair already exists.
    async fn link_membership(&self, lead_id: Uuid, collection_id: i64) -> Result<()>;

    /// Append a usage audit row.
    async fn record_usage(&self, usage: &UsageRecord) -> Result<()>;
}

// Arc<S> blanket — lets tests share the store for assertions.
#[async_trait]
impl<S: LeadStore + ?Sized> LeadStore for Arc<S> {
    async fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<CompanyRow>> {
        (**self).find_company(lookup).await
    }

    async fn insert_company(&self, fragment: &CompanyFragment) -> Result<CompanyRow> {
        (**self).insert_company(fragment).await
    }

    async fn find_lead_by_identity(
        &self,
        scope: &IngestScope,
        email: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Result<Option<LeadRow>> {
        (**self).find_lead_by_identity(scope, email, linkedin_url).await
    }

    async fn find_lead_by_name(
        &self,
        scope: &IngestScope,
        first_name: &str,
        last_name: &str,
        company_id: Option<Uuid>,
    ) -> Result<Option<LeadRow>> {
        (**self)
            .find_lead_by_name(scope, first_name, last_name, company_id)
            .await
    }

    async fn insert_lead(
        &self,
        scope: &IngestScope,
        fragment: &PersonFragment,
        company_id: Option<Uuid>,
    ) -> Result<LeadRow> {
        (**self).insert_lead(scope, fragment, company_id).await
    }

    async fn update_lead(&self, id: Uuid, patch: &LeadPatch) -> Result<()> {
        (**self).update_lead(id, patch).await
    }

    async fn link_membership(&self, lead_id: Uuid, collection_id: i64) -> Result<()> {
        (**self).link_membership(lead_id, collection_id).await
    }

    async fn record_usage(&self, usage: &UsageRecord) -> Result<()> {
        (**self).record_usage(usage).await
    }
}
