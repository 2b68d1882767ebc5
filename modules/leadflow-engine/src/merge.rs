//! Field-level merge policy.
//!
//! Default rule: fill only what is currently empty. Email is the one
//! ranked-override attribute: a new value may replace a stored one when its
//! certainty label ranks at least as high, and email + certainty always move
//! together. Nothing is ever cleared; the policy only adds or upgrades.

use leadflow_common::{certainty, PersonFragment};
use uuid::Uuid;

use crate::store::{LeadPatch, LeadRow};

fn missing(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_deref().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Decide, field by field, what an incoming fragment may write into an
/// existing Lead. Returns `None` when zero columns would change, so callers
/// can skip the update entirely.
pub fn build_patch(
    existing: &LeadRow,
    incoming: &PersonFragment,
    company_id: Option<Uuid>,
) -> Option<LeadPatch> {
    let mut patch = LeadPatch::default();

    macro_rules! fill {
        ($field:ident) => {
            if missing(&existing.$field) {
                patch.$field = present(&incoming.$field);
            }
        };
    }
    fill!(linkedin_url);
    fill!(personal_email);
    fill!(external_person_id);
    fill!(public_identifier);
    fill!(full_name);
    fill!(first_name);
    fill!(last_name);
    fill!(position);
    fill!(headline);
    fill!(about);
    fill!(seniority);
    fill!(functional_area);
    fill!(city);
    fill!(state);
    fill!(country);
    fill!(email_verification_status);

    if existing.email_verified_at.is_none() {
        patch.email_verified_at = incoming.email_verified_at;
    }

    if existing.phone_numbers.is_empty() && !incoming.phone_numbers.is_empty() {
        patch.phone_numbers = Some(incoming.phone_numbers.clone());
    }

    if existing.company_id.is_none() {
        patch.company_id = company_id;
    }

    // Email: adopt unconditionally when none stored, otherwise only on
    // equal-or-higher certainty. Every overwrite goes through the ranker.
    if let Some(new_email) = present(&incoming.email) {
        let adopt = missing(&existing.email)
            || certainty::is_at_least_as_certain(
                incoming.email_certainty.as_deref(),
                existing.email_certainty.as_deref(),
            );
        if adopt {
            if existing.email.as_deref() != Some(new_email.as_str()) {
                patch.email = Some(new_email);
            }
            if incoming.email_certainty.is_some()
                && incoming.email_certainty != existing.email_certainty
            {
                patch.email_certainty = incoming.email_certainty.clone();
            }
        }
    }

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}
