//! In-memory store for testing. No database required. Thread-safe.
//!
//! Lookups scan in insertion order, which doubles as the "store default
//! order" tie-break the resolvers rely on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use leadflow_common::{CompanyFragment, IngestScope, PersonFragment};
use uuid::Uuid;

use super::{CompanyLookup, CompanyRow, LeadPatch, LeadRow, LeadStore, UsageRecord};

#[derive(Default)]
struct Inner {
    companies: Vec<CompanyRow>,
    leads: Vec<LeadRow>,
    memberships: Vec<(Uuid, i64)>,
    usage: Vec<UsageRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_usage: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `record_usage` call fail, for exercising the
    /// best-effort audit path.
    pub fn fail_usage_writes(&self) {
        self.fail_usage.store(true, Ordering::SeqCst);
    }

    // --- Test assertion accessors ---

    pub fn company_count(&self) -> usize {
        self.inner.lock().unwrap().companies.len()
    }

    pub fn lead_count(&self) -> usize {
        self.inner.lock().unwrap().leads.len()
    }

    pub fn companies(&self) -> Vec<CompanyRow> {
        self.inner.lock().unwrap().companies.clone()
    }

    pub fn leads(&self) -> Vec<LeadRow> {
        self.inner.lock().unwrap().leads.clone()
    }

    pub fn memberships(&self) -> Vec<(Uuid, i64)> {
        self.inner.lock().unwrap().memberships.clone()
    }

    pub fn usage(&self) -> Vec<UsageRecord> {
        self.inner.lock().unwrap().usage.clone()
    }

    pub fn lead_by_email(&self, email: &str) -> Option<LeadRow> {
        self.inner
            .lock()
            .unwrap()
            .leads
            .iter()
            .find(|l| l.email.as_deref() == Some(email))
            .cloned()
    }
}

fn in_collection(memberships: &[(Uuid, i64)], lead_id: Uuid, collection_id: i64) -> bool {
    memberships.iter().any(|(l, c)| *l == lead_id && *c == collection_id)
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn find_company(&self, lookup: &CompanyLookup) -> Result<Option<CompanyRow>> {
        if lookup.is_empty() {
            return Ok(None);
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .companies
            .iter()
            .find(|c| {
                lookup.name.as_deref().is_some_and(|n| c.name == n)
                    || (lookup.domain.is_some() && c.domain == lookup.domain)
                    || (lookup.website.is_some() && c.website == lookup.website)
            })
            .cloned())
    }

    async fn insert_company(&self, fragment: &CompanyFragment) -> Result<CompanyRow> {
        let Some(name) = fragment.name.clone() else {
            bail!("company fragment has no name");
        };
        let now = Utc::now();
        let row = CompanyRow {
            id: Uuid::new_v4(),
            name,
            website: fragment.website.clone(),
            domain: fragment.domain.clone(),
            linkedin_url: fragment.linkedin_url.clone(),
            founded_year: fragment.founded_year,
            industry: fragment.industry.clone(),
            size: fragment.size.clone(),
            description: fragment.description.clone(),
            specialities: fragment.specialities.clone(),
            technologies: fragment.technologies.clone(),
            city: fragment.city.clone(),
            state: fragment.state.clone(),
            country: fragment.country.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().companies.push(row.clone());
        Ok(row)
    }

    async fn find_lead_by_identity(
        &self,
        scope: &IngestScope,
        email: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Result<Option<LeadRow>> {
        if email.is_none() && linkedin_url.is_none() {
            return Ok(None);
        }
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .leads
            .iter()
            .find(|l| {
                l.owner_user_id == scope.owner_user_id
                    && in_collection(&inner.memberships, l.id, scope.collection_id)
                    && (email.is_some_and(|e| l.email.as_deref() == Some(e))
                        || linkedin_url.is_some_and(|u| l.linkedin_url.as_deref() == Some(u)))
            })
            .cloned())
    }

    async fn find_lead_by_name(
        &self,
        scope: &IngestScope,
        first_name: &str,
        last_name: &str,
        company_id: Option<Uuid>,
    ) -> Result<Option<LeadRow>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .leads
            .iter()
            .find(|l| {
                l.owner_user_id == scope.owner_user_id
                    && in_collection(&inner.memberships, l.id, scope.collection_id)
                    && l.first_name.as_deref() == Some(first_name)
                    && l.last_name.as_deref() == Some(last_name)
                    && company_id.is_none_or(|cid| l.company_id == Some(cid))
            })
            .cloned())
    }

    async fn insert_lead(
        &self,
        scope: &IngestScope,
        fragment: &PersonFragment,
        company_id: Option<Uuid>,
    ) -> Result<LeadRow> {
        let now = Utc::now();
        let row = LeadRow {
            id: Uuid::new_v4(),
            owner_user_id: scope.owner_user_id,
            company_id,
            email: fragment.email.clone(),
            email_certainty: fragment.email_certainty.clone(),
            email_verification_status: fragment.email_verification_status.clone(),
            email_verified_at: fragment.email_verified_at,
            linkedin_url: fragment.linkedin_url.clone(),
            personal_email: fragment.personal_email.clone(),
            external_person_id: fragment.external_person_id.clone(),
            public_identifier: fragment.public_identifier.clone(),
            full_name: fragment.full_name.clone(),
            first_name: fragment.first_name.clone(),
            last_name: fragment.last_name.clone(),
            position: fragment.position.clone(),
            headline: fragment.headline.clone(),
            about: fragment.about.clone(),
            seniority: fragment.seniority.clone(),
            functional_area: fragment.functional_area.clone(),
            phone_numbers: fragment.phone_numbers.clone(),
            city: fragment.city.clone(),
            state: fragment.state.clone(),
            country: fragment.country.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().unwrap().leads.push(row.clone());
        Ok(row)
    }

    async fn update_lead(&self, id: Uuid, patch: &LeadPatch) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let Some(lead) = inner.leads.iter_mut().find(|l| l.id == id) else {
            bail!("no lead with id {id}");
        };

        macro_rules! apply {
            ($field:ident) => {
                if let Some(v) = &patch.$field {
                    lead.$field = Some(v.clone());
                }
            };
        }
        apply!(email);
        apply!(email_certainty);
        apply!(email_verification_status);
        apply!(linkedin_url);
        apply!(personal_email);
        apply!(external_person_id);
        apply!(public_identifier);
        apply!(full_name);
        apply!(first_name);
        apply!(last_name);
        apply!(position);
        apply!(headline);
        apply!(about);
        apply!(seniority);
        apply!(functional_area);
        apply!(city);
        apply!(state);
        apply!(country);
        if let Some(ts) = patch.email_verified_at {
            lead.email_verified_at = Some(ts);
        }
        if let Some(phones) = &patch.phone_numbers {
            lead.phone_numbers = phones.clone();
        }
        if let Some(cid) = patch.company_id {
            lead.company_id = Some(cid);
        }
        lead.updated_at = Utc::now();
        Ok(())
    }

    async fn link_membership(&self, lead_id: Uuid, collection_id: i64) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !in_collection(&inner.memberships, lead_id, collection_id) {
            inner.memberships.push((lead_id, collection_id));
        }
        Ok(())
    }

    async fn record_usage(&self, usage: &UsageRecord) -> Result<()> {
        if self.fail_usage.load(Ordering::SeqCst) {
            bail!("usage sink unavailable");
        }
        self.inner.lock().unwrap().usage.push(usage.clone());
        Ok(())
    }
}
