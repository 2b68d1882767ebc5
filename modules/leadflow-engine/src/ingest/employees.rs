//! Company-employee scraper rows: snake_case, usually no email, company as
//! a nested object or a flat name. Matching falls back to name+company.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use leadflow_common::{normalize, CompanyFragment, PersonFragment};
use serde::Deserialize;
use serde_json::Value;

use super::{string_values, Adapted, RecordFragments, SourceAdapter};

#[derive(Debug, Default, Deserialize)]
struct RawEmployee {
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default, alias = "name")]
    full_name: Option<String>,
    #[serde(default, alias = "job_title", alias = "title")]
    position: Option<String>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    seniority: Option<String>,
    #[serde(default, alias = "department")]
    functional_area: Option<String>,
    #[serde(default, alias = "profile_url", alias = "linkedin")]
    linkedin_url: Option<Value>,
    #[serde(default)]
    public_identifier: Option<String>,
    #[serde(default, alias = "member_id")]
    external_person_id: Option<Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_certainty: Option<String>,
    #[serde(default, alias = "location_city")]
    city: Option<String>,
    #[serde(default, alias = "location_state")]
    state: Option<String>,
    #[serde(default, alias = "location_country")]
    country: Option<String>,

    #[serde(default)]
    company: Option<RawEmployeeCompany>,
    #[serde(default, alias = "current_company")]
    company_name: Option<String>,
    #[serde(default)]
    company_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEmployeeCompany {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "website_url")]
    website: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    linkedin_url: Option<Value>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default, alias = "company_size")]
    size: Option<Value>,
    #[serde(default, alias = "founded")]
    founded_year: Option<Value>,
    #[serde(default, alias = "specialties")]
    specialities: Option<Value>,
}

pub struct EmployeeAdapter;

impl SourceAdapter for EmployeeAdapter {
    fn source_tag(&self) -> &'static str {
        "employee_scraper"
    }

    fn name_fallback(&self) -> bool {
        true
    }

    fn adapt(&self, raw: &Value) -> Result<Adapted> {
        let record: RawEmployee =
            serde_json::from_value(raw.clone()).context("employee record shape")?;

        let person = PersonFragment {
            email: record.email.as_deref().and_then(normalize::email),
            email_certainty: record.email_certainty.as_deref().and_then(normalize::non_empty),
            linkedin_url: record.linkedin_url.as_ref().and_then(normalize::url_value),
            external_person_id: record
                .external_person_id
                .as_ref()
                .and_then(normalize::string_like),
            public_identifier: record.public_identifier.as_deref().and_then(normalize::non_empty),
            full_name: record.full_name.as_deref().and_then(normalize::non_empty),
            first_name: record.first_name.as_deref().and_then(normalize::non_empty),
            last_name: record.last_name.as_deref().and_then(normalize::non_empty),
            position: record.position.as_deref().and_then(normalize::non_empty),
            headline: record.headline.as_deref().and_then(normalize::non_empty),
            seniority: record.seniority.as_deref().and_then(normalize::non_empty),
            functional_area: record.functional_area.as_deref().and_then(normalize::non_empty),
            city: record.city.as_deref().and_then(normalize::non_empty),
            state: record.state.as_deref().and_then(normalize::non_empty),
            country: record.country.as_deref().and_then(normalize::non_empty),
            ..Default::default()
        };

        let nested = record.company.as_ref();
        let website = nested
            .and_then(|c| c.website.as_deref())
            .and_then(normalize::non_empty);
        let domain = nested
            .and_then(|c| c.domain.as_deref())
            .or(record.company_domain.as_deref())
            .and_then(normalize::extract_domain)
            .or_else(|| website.as_deref().and_then(normalize::extract_domain));

        let company = CompanyFragment {
            name: nested
                .and_then(|c| c.name.as_deref())
                .or(record.company_name.as_deref())
                .and_then(normalize::non_empty),
            website,
            domain,
            linkedin_url: nested
                .and_then(|c| c.linkedin_url.as_ref())
                .and_then(normalize::url_value),
            industry: nested
                .and_then(|c| c.industry.as_deref())
                .and_then(normalize::non_empty),
            size: nested.and_then(|c| c.size.as_ref()).and_then(normalize::string_like),
            founded_year: nested
                .and_then(|c| c.founded_year.as_ref())
                .and_then(normalize::year),
            specialities: nested
                .and_then(|c| c.specialities.as_ref())
                .map(string_values)
                .unwrap_or_default(),
            extra: BTreeMap::new(),
            ..Default::default()
        };

        Ok(Adapted::Record(Box::new(RecordFragments { person, company })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snake_case_row_with_nested_company() {
        let raw = json!({
            "first_name": "Louis",
            "last_name": "Pasteur",
            "job_title": "Research Director",
            "profile_url": "https://linkedin.com/in/lpasteur",
            "company": {
                "name": "Acme",
                "domain": "www.acme.com",
                "company_size": "11-50"
            }
        });

        let Adapted::Record(rec) = EmployeeAdapter.adapt(&raw).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.person.first_name.as_deref(), Some("Louis"));
        assert_eq!(rec.person.position.as_deref(), Some("Research Director"));
        assert_eq!(
            rec.person.linkedin_url.as_deref(),
            Some("https://linkedin.com/in/lpasteur")
        );
        assert_eq!(rec.company.name.as_deref(), Some("Acme"));
        assert_eq!(rec.company.domain.as_deref(), Some("acme.com"));
        assert_eq!(rec.company.size.as_deref(), Some("11-50"));
    }

    #[test]
    fn flat_company_name_still_resolves() {
        let raw = json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "current_company": "Analytical Engines Ltd"
        });

        let Adapted::Record(rec) = EmployeeAdapter.adapt(&raw).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.company.name.as_deref(), Some("Analytical Engines Ltd"));
        assert!(rec.person.has_full_name_keys());
        assert!(!rec.person.has_identity_key());
    }
}
