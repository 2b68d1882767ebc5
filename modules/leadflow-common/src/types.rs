use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Batch scope ---

/// Ownership and targeting for one ingestion batch. Resolution is always
/// scoped to one owning user plus one target collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestScope {
    pub owner_user_id: i64,
    pub collection_id: i64,
    pub source_job_id: Option<String>,
    pub source_scraper_id: Option<i64>,
}

impl IngestScope {
    pub fn new(owner_user_id: i64, collection_id: i64) -> Self {
        Self {
            owner_user_id,
            collection_id,
            source_job_id: None,
            source_scraper_id: None,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.source_job_id = Some(job_id.into());
        self
    }

    pub fn with_scraper_id(mut self, scraper_id: i64) -> Self {
        self.source_scraper_id = Some(scraper_id);
        self
    }
}

// --- Batch outcome ---

/// Per-batch outcome counters. Always consistent with the number of input
/// records: created + skipped + errors + enriched == records processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub created: u32,
    pub skipped: u32,
    pub errors: u32,
    pub enriched: u32,
}

impl BatchSummary {
    pub fn total(&self) -> u32 {
        self.created + self.skipped + self.errors + self.enriched
    }
}

// --- Fragments ---

/// Normalized, partial view of a person extracted from one upstream record.
/// Every field is optional; adapters fill in whatever their source carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonFragment {
    // Identity keys
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub personal_email: Option<String>,
    pub external_person_id: Option<String>,
    pub public_identifier: Option<String>,

    // Descriptive
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<String>,
    pub headline: Option<String>,
    pub about: Option<String>,
    pub seniority: Option<String>,
    pub functional_area: Option<String>,

    // Contact / location
    pub phone_numbers: Vec<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,

    // Confidence + verification
    pub email_certainty: Option<String>,
    pub email_verification_status: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,

    /// Source keys the adapter saw but the canonical schema doesn't model.
    /// Bounded pass-through for forward compatibility; not persisted.
    pub extra: BTreeMap<String, String>,
}

impl PersonFragment {
    /// True when the fragment carries at least one exact-match identity key.
    pub fn has_identity_key(&self) -> bool {
        self.email.is_some() || self.linkedin_url.is_some()
    }

    /// True when the fragment can be matched by first+last name.
    pub fn has_full_name_keys(&self) -> bool {
        self.first_name.is_some() && self.last_name.is_some()
    }
}

/// Normalized, partial view of an organization extracted from one upstream
/// record. `name` is the only field required to create a Company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyFragment {
    pub name: Option<String>,
    pub website: Option<String>,
    /// Normalized host, lowercase, without a leading "www.".
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
    pub extra: BTreeMap<String, String>,
}

impl CompanyFragment {
    /// A company fragment without a name can never be resolved or created.
    pub fn is_resolvable(&self) -> bool {
        self.name.is_some()
    }
}
