//! Ranking of email-certainty labels.
//!
//! A lookup table rather than an enum: new labels introduced by new upstream
//! sources degrade to the default rank instead of failing to deploy.

/// Rank assigned to labels no source has taught us about yet — the lowest
/// tier above "no email at all".
pub const DEFAULT_RANK: u8 = 1;

const RANKS: &[(&str, u8)] = &[
    ("ultra_sure", 4),
    ("sure", 3),
    ("probable", 2),
    ("risky", 1),
];

/// Rank of a certainty label. Unrecognized labels get [`DEFAULT_RANK`].
pub fn rank(label: &str) -> u8 {
    RANKS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, r)| *r)
        .unwrap_or(DEFAULT_RANK)
}

/// The single decision point for every email-overwrite decision: may a value
/// tagged `new` replace one tagged `existing`?
///
/// No existing label → adopt unconditionally. No new label → keep what we
/// have. Otherwise replace iff the new rank is at least the existing rank.
pub fn is_at_least_as_certain(new: Option<&str>, existing: Option<&str>) -> bool {
    match (new, existing) {
        (_, None) => true,
        (None, Some(_)) => false,
        (Some(n), Some(e)) => rank(n) >= rank(e),
    }
}
