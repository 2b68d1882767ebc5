//! Email-discovery job results. A NOT_FOUND result carries no usable
//! identity and is counted as skipped — it never creates or merges.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use leadflow_common::{normalize, CompanyFragment, PersonFragment};
use serde::Deserialize;
use serde_json::Value;

use super::{Adapted, RecordFragments, SourceAdapter};

#[derive(Debug, Default, Deserialize)]
struct RawDiscovery {
    #[serde(default, alias = "email_address")]
    email: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, alias = "confidence")]
    certainty: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default, alias = "name")]
    full_name: Option<String>,
    #[serde(default, alias = "linkedin_url")]
    linkedin_url: Option<Value>,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default, alias = "domain")]
    company_domain: Option<String>,
}

pub struct EmailDiscoveryAdapter;

impl SourceAdapter for EmailDiscoveryAdapter {
    fn source_tag(&self) -> &'static str {
        "email_discovery"
    }

    fn adapt(&self, raw: &Value) -> Result<Adapted> {
        let record: RawDiscovery =
            serde_json::from_value(raw.clone()).context("discovery record shape")?;

        if record
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("NOT_FOUND"))
        {
            return Ok(Adapted::Skip("status NOT_FOUND".into()));
        }
        let Some(email) = record.email.as_deref().and_then(normalize::email) else {
            return Ok(Adapted::Skip("no email in discovery result".into()));
        };

        let person = PersonFragment {
            email: Some(email),
            email_certainty: record.certainty.as_deref().and_then(normalize::non_empty),
            linkedin_url: record.linkedin_url.as_ref().and_then(normalize::url_value),
            full_name: record.full_name.as_deref().and_then(normalize::non_empty),
            first_name: record.first_name.as_deref().and_then(normalize::non_empty),
            last_name: record.last_name.as_deref().and_then(normalize::non_empty),
            ..Default::default()
        };

        let domain = record.company_domain.as_deref().and_then(normalize::extract_domain);
        let company = CompanyFragment {
            name: record.company_name.as_deref().and_then(normalize::non_empty),
            domain,
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
    fn found_result_yields_email_fragment() {
        let raw = json!({
            "email": "Jane@Acme.com",
            "status": "FOUND",
            "confidence": "ultra_sure",
            "first_name": "Jane",
            "last_name": "Doe",
            "company_name": "Acme",
            "domain": "acme.com"
        });

        let Adapted::Record(rec) = EmailDiscoveryAdapter.adapt(&raw).unwrap() else {
            panic!("expected record");
        };
        assert_eq!(rec.person.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(rec.person.email_certainty.as_deref(), Some("ultra_sure"));
        assert_eq!(rec.company.domain.as_deref(), Some("acme.com"));
    }

    #[test]
    fn not_found_is_skip() {
        let raw = json!({ "status": "NOT_FOUND", "first_name": "Jane" });
        assert!(matches!(
            EmailDiscoveryAdapter.adapt(&raw).unwrap(),
            Adapted::Skip(_)
        ));
    }

    #[test]
    fn missing_email_is_skip_not_error() {
        let raw = json!({ "status": "FOUND" });
        assert!(matches!(
            EmailDiscoveryAdapter.adapt(&raw).unwrap(),
            Adapted::Skip(_)
        ));
    }
}
