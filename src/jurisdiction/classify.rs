//! Jurisdiction membership.
//!
//! An absent country or region never excludes a visitor: a failed lookup
//! must not silently hide the consent tool.

use std::collections::BTreeMap;

use crate::error_handling::ClassificationError;
use crate::geoip::LocationRecord;

use super::registry::{
    Classification, CustomPredicate, Jurisdiction, JurisdictionKey, JurisdictionRegistry,
    EU_EEA_COUNTRIES,
};

/// Evaluates one jurisdiction's rule against a location.
pub fn matches(jurisdiction: &Jurisdiction, location: &LocationRecord) -> bool {
    match &jurisdiction.classification {
        Classification::CountryMatch(country) => {
            field_matches(location.country.as_deref(), |c| c == *country)
        }
        Classification::RegionMatch { region, .. } => {
            field_matches(location.region.as_deref(), |r| r == *region)
        }
        Classification::Custom(predicate) => custom_matches(*predicate, location),
    }
}

fn custom_matches(predicate: CustomPredicate, location: &LocationRecord) -> bool {
    match predicate {
        CustomPredicate::EuEea => field_matches(location.country.as_deref(), |c| {
            EU_EEA_COUNTRIES.iter().any(|member| *member == c)
        }),
    }
}

fn field_matches(value: Option<&str>, predicate: impl FnOnce(&str) -> bool) -> bool {
    match value {
        None => true,
        Some(value) => predicate(value),
    }
}

/// Returns whether the location falls inside the jurisdiction.
///
/// # Errors
///
/// Returns `ClassificationError::NotRegistered` if the key has no entry in
/// the registry.
pub fn is_in_jurisdiction(
    registry: &JurisdictionRegistry,
    location: &LocationRecord,
    key: JurisdictionKey,
) -> Result<bool, ClassificationError> {
    let jurisdiction = registry.get(key)?;
    Ok(matches(jurisdiction, location))
}

/// Membership of the location in every registered jurisdiction.
pub fn classify_all(
    registry: &JurisdictionRegistry,
    location: &LocationRecord,
) -> BTreeMap<JurisdictionKey, bool> {
    registry
        .iter()
        .map(|jurisdiction| (jurisdiction.key, matches(jurisdiction, location)))
        .collect()
}
