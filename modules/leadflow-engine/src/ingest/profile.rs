//! Generic profile+company records — the shape produced by the profile
//! scraper jobs. camelCase keys with a trail of historical snake_case
//! aliases; the company arrives nested, flat, or as just a name.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use leadflow_common::{normalize, CompanyFragment, PersonFragment};
use serde::Deserialize;
use serde_json::Value;

use super::{phone_list, string_values, Adapted, RecordFragments, SourceAdapter};

/// Keys the pass-through map will keep, at most. Upstream payloads can be
/// arbitrarily wide; the extension map is bounded by contract.
const MAX_EXTRA_KEYS: usize = 16;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfile {
    #[serde(default, alias = "email_address", alias = "emailAddress")]
    email: Option<String>,
    #[serde(default, alias = "email_certainty", alias = "certainty")]
    email_certainty: Option<String>,
    #[serde(default, alias = "linkedin_url", alias = "profileUrl", alias = "profile_url")]
    linkedin_url: Option<Value>,
    #[serde(default, alias = "personal_email", alias = "privateEmail")]
    personal_email: Option<String>,
    #[serde(default, alias = "member_id", alias = "memberId")]
    external_person_id: Option<Value>,
    #[serde(default, alias = "public_identifier")]
    public_identifier: Option<String>,

    #[serde(default, alias = "full_name", alias = "name")]
    full_name: Option<String>,
    #[serde(default, alias = "first_name")]
    first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    last_name: Option<String>,
    #[serde(default, alias = "job_title", alias = "jobTitle", alias = "title")]
    position: Option<String>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default, alias = "summary")]
    about: Option<String>,
    #[serde(default)]
    seniority: Option<String>,
    #[serde(default, alias = "functional_area", alias = "department")]
    functional_area: Option<String>,

    #[serde(default, alias = "phone_numbers", alias = "phones")]
    phone_numbers: Option<Value>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "region")]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,

    #[serde(default)]
    company: Option<RawProfileCompany>,
    #[serde(default, alias = "company_name", alias = "organization")]
    company_name: Option<String>,
    #[serde(default, alias = "company_website")]
    company_website: Option<String>,
    #[serde(default, alias = "company_domain")]
    company_domain: Option<String>,

    #[serde(flatten)]
    unrecognized: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProfileCompany {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "website_url", alias = "websiteUrl", alias = "url")]
    website: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default, alias = "linkedin_url")]
    linkedin_url: Option<Value>,
    #[serde(default, alias = "founded_year", alias = "founded")]
    founded_year: Option<Value>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default, alias = "company_size", alias = "companySize", alias = "employeeRange")]
    size: Option<Value>,
    #[serde(default)]
    description: Option<String>,
    // Both spellings circulate upstream.
    #[serde(default, alias = "specialties")]
    specialities: Option<Value>,
    #[serde(default)]
    technologies: Option<Value>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "region")]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

pub struct ProfileAdapter;

impl SourceAdapter for ProfileAdapter {
    fn source_tag(&self) -> &'static str {
        "profile_scraper"
    }

    fn adapt(&self, raw: &Value) -> Result<Adapted> {
        let record: RawProfile =
            serde_json::from_value(raw.clone()).context("profile record shape")?;

        let person = PersonFragment {
            email: record.email.as_deref().and_then(normalize::email),
            email_certainty: record.email_certainty.as_deref().and_then(normalize::non_empty),
            linkedin_url: record.linkedin_url.as_ref().and_then(normalize::url_value),
            personal_email: record.personal_email.as_deref().and_then(normalize::email),
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
            about: record.about.as_deref().and_then(normalize::non_empty),
            seniority: record.seniority.as_deref().and_then(normalize::non_empty),
            functional_area: record.functional_area.as_deref().and_then(normalize::non_empty),
            phone_numbers: record
                .phone_numbers
                .as_ref()
                .map(phone_list)
                .unwrap_or_default(),
            city: record.city.as_deref().and_then(normalize::non_empty),
            state: record.state.as_deref().and_then(normalize::non_empty),
            country: record.country.as_deref().and_then(normalize::non_empty),
            email_verification_status: None,
            email_verified_at: None,
            extra: pass_through(&record.unrecognized),
        };

        let company = company_fragment(&record);

        Ok(Adapted::Record(Box::new(RecordFragments { person, company })))
    }
}

fn company_fragment(record: &RawProfile) -> CompanyFragment {
    let nested = record.company.as_ref();

    let name = nested
        .and_then(|c| c.name.as_deref())
        .or(record.company_name.as_deref())
        .and_then(normalize::non_empty);
    let website = nested
        .and_then(|c| c.website.as_deref())
        .or(record.company_website.as_deref())
        .and_then(normalize::non_empty);
    let domain = nested
        .and_then(|c| c.domain.as_deref())
        .or(record.company_domain.as_deref())
        .and_then(normalize::extract_domain)
        .or_else(|| website.as_deref().and_then(normalize::extract_domain));

    CompanyFragment {
        name,
        website,
        domain,
        linkedin_url: nested
            .and_then(|c| c.linkedin_url.as_ref())
            .and_then(normalize::url_value),
        founded_year: nested.and_then(|c| c.founded_year.as_ref()).and_then(normalize::year),
        industry: nested
            .and_then(|c| c.industry.as_deref())
            .and_then(normalize::non_empty),
        size: nested.and_then(|c| c.size.as_ref()).and_then(normalize::string_like),
        description: nested
            .and_then(|c| c.description.as_deref())
            .and_then(normalize::non_empty),
        specialities: nested
            .and_then(|c| c.specialities.as_ref())
            .map(string_values)
            .unwrap_or_default(),
        technologies: nested
            .and_then(|c| c.technologies.as_ref())
            .and_then(normalize::string_like),
        city: nested.and_then(|c| c.city.as_deref()).and_then(normalize::non_empty),
        state: nested.and_then(|c| c.state.as_deref()).and_then(normalize::non_empty),
        country: nested
            .and_then(|c| c.country.as_deref())
            .and_then(normalize::non_empty),
        extra: BTreeMap::new(),
    }
}

/// Keep unrecognized scalar string keys, bounded.
fn pass_through(unrecognized: &BTreeMap<String, Value>) -> BTreeMap<String, String> {
    unrecognized
        .iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .take(MAX_EXTRA_KEYS)
        .collect()
}
