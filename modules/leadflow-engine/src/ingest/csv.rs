//! CSV-imported rows, keyed by the column headers users actually upload.
//! Parsing happens upstream; each row arrives as an object of strings.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use leadflow_common::{normalize, CompanyFragment, PersonFragment};
use serde::Deserialize;
use serde_json::Value;

use super::{Adapted, RecordFragments, SourceAdapter};

#[derive(Debug, Default, Deserialize)]
struct RawCsvRow {
    #[serde(default, rename = "First Name", alias = "First name", alias = "first_name")]
    first_name: Option<String>,
    #[serde(default, rename = "Last Name", alias = "Last name", alias = "last_name")]
    last_name: Option<String>,
    #[serde(default, rename = "Full Name", alias = "Name", alias = "full_name")]
    full_name: Option<String>,
    #[serde(default, rename = "Email", alias = "Email Address", alias = "email")]
    email: Option<String>,
    #[serde(
        default,
        rename = "LinkedIn URL",
        alias = "LinkedIn",
        alias = "Linkedin Url",
        alias = "linkedin_url"
    )]
    linkedin_url: Option<String>,
    #[serde(
        default,
        rename = "Job Title",
        alias = "Position",
        alias = "Title",
        alias = "position"
    )]
    position: Option<String>,
    #[serde(default, rename = "Phone", alias = "Phone Number", alias = "phone")]
    phone: Option<String>,
    #[serde(default, rename = "City", alias = "city")]
    city: Option<String>,
    #[serde(default, rename = "State", alias = "state")]
    state: Option<String>,
    #[serde(default, rename = "Country", alias = "country")]
    country: Option<String>,

    #[serde(default, rename = "Company", alias = "Company Name", alias = "company")]
    company_name: Option<String>,
    #[serde(
        default,
        rename = "Website",
        alias = "Company Website",
        alias = "website"
    )]
    website: Option<String>,
    #[serde(default, rename = "Domain", alias = "domain")]
    domain: Option<String>,
    #[serde(default, rename = "Industry", alias = "industry")]
    industry: Option<String>,
}

pub struct CsvAdapter;

impl SourceAdapter for CsvAdapter {
    fn source_tag(&self) -> &'static str {
        "csv_import"
    }

    fn name_fallback(&self) -> bool {
        true
    }

    fn adapt(&self, raw: &Value) -> Result<Adapted> {
        let row: RawCsvRow = serde_json::from_value(raw.clone()).context("csv row shape")?;

        let website = row.website.as_deref().and_then(normalize::non_empty);
        let domain = row
            .domain
            .as_deref()
            .and_then(normalize::extract_domain)
            .or_else(|| website.as_deref().and_then(normalize::extract_domain));

        let person = PersonFragment {
            email: row.email.as_deref().and_then(normalize::email),
            linkedin_url: row.linkedin_url.as_deref().and_then(normalize::url_or_first),
            full_name: row.full_name.as_deref().and_then(normalize::non_empty),
            first_name: row.first_name.as_deref().and_then(normalize::non_empty),
            last_name: row.last_name.as_deref().and_then(normalize::non_empty),
            position: row.position.as_deref().and_then(normalize::non_empty),
            phone_numbers: row
                .phone
                .as_deref()
                .and_then(normalize::non_empty)
                .into_iter()
                .collect(),
            city: row.city.as_deref().and_then(normalize::non_empty),
            state: row.state.as_deref().and_then(normalize::non_empty),
            country: row.country.as_deref().and_then(normalize::non_empty),
            ..Default::default()
        };

        let company = CompanyFragment {
            name: row.company_name.as_deref().and_then(normalize::non_empty),
            website,
            domain,
            industry: row.industry.as_deref().and_then(normalize::non_empty),
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
    fn header_names_map_to_fragments() {
        let raw = json!({
            "First Name": "Marie",
            "Last Name": "Curie",
            "Email": "MARIE@curie.fr",
            "Company": "Radium Institute",
            "Website": "https://www.curie.fr",
            "Phone": "+33 1 00 00 00 00"
        });

        let Adapted::Record(rec) = CsvAdapter.adapt(&raw).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.person.email.as_deref(), Some("marie@curie.fr"));
        assert_eq!(rec.person.first_name.as_deref(), Some("Marie"));
        assert_eq!(rec.person.phone_numbers, vec!["+33 1 00 00 00 00"]);
        assert_eq!(rec.company.name.as_deref(), Some("Radium Institute"));
        assert_eq!(rec.company.domain.as_deref(), Some("curie.fr"));
    }

    #[test]
    fn empty_cells_become_none() {
        let raw = json!({
            "First Name": "  ",
            "Email": "",
            "Company": ""
        });

        let Adapted::Record(rec) = CsvAdapter.adapt(&raw).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.person.first_name, None);
        assert_eq!(rec.person.email, None);
        assert!(!rec.company.is_resolvable());
    }
}
