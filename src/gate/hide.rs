//! Location-based hide decision.

use crate::error_handling::ClassificationError;
use crate::geoip::LocationRecord;
use crate::jurisdiction::{is_in_jurisdiction, JurisdictionRegistry};
use crate::settings::JurisdictionToggleSet;

/// Decides whether the consent tool is hidden for a visitor at `location`.
///
/// Jurisdictions are checked in registry order. The tool is hidden as soon
/// as the visitor is inside a jurisdiction whose toggle is off, and also
/// when the visitor is inside no jurisdiction at all. An unknown location is
/// inside every jurisdiction, so it is only shown when all toggles are on.
pub fn should_hide_consent_tool(
    registry: &JurisdictionRegistry,
    toggles: &JurisdictionToggleSet,
    location: &LocationRecord,
) -> Result<bool, ClassificationError> {
    let mut matched_any = false;
    for key in registry.keys() {
        if !is_in_jurisdiction(registry, location, key)? {
            continue;
        }
        matched_any = true;
        if !toggles.is_shown_in(key) {
            log::debug!("Visitor in {} where the consent tool is off", key);
            return Ok(true);
        }
    }

    if !matched_any {
        log::debug!("Visitor outside every configured jurisdiction");
    }
    Ok(!matched_any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jurisdiction::JurisdictionKey;
    use strum::IntoEnumIterator;

    fn all_on() -> JurisdictionToggleSet {
        JurisdictionToggleSet::new(JurisdictionKey::iter().map(|key| (key, true)))
    }

    fn only(keys: &[JurisdictionKey]) -> JurisdictionToggleSet {
        JurisdictionToggleSet::new(keys.iter().map(|key| (*key, true)))
    }

    fn country(name: &str) -> LocationRecord {
        LocationRecord {
            country: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_location_shown_when_everything_on() {
        let registry = JurisdictionRegistry::standard();
        assert_eq!(
            should_hide_consent_tool(&registry, &all_on(), &LocationRecord::default()),
            Ok(false)
        );
    }

    #[test]
    fn test_unknown_location_hidden_when_any_toggle_off() {
        let registry = JurisdictionRegistry::standard();
        let mut toggles: Vec<_> = JurisdictionKey::iter().map(|key| (key, true)).collect();
        toggles.retain(|(key, _)| *key != JurisdictionKey::Utah);
        let toggles = JurisdictionToggleSet::new(toggles);
        assert_eq!(
            should_hide_consent_tool(&registry, &toggles, &LocationRecord::default()),
            Ok(true)
        );
    }

    #[test]
    fn test_disabled_jurisdiction_containing_visitor_hides() {
        let registry = JurisdictionRegistry::standard();
        let denver = LocationRecord {
            city: Some("Denver".to_string()),
            region: Some("Colorado".to_string()),
            country: Some("United States".to_string()),
        };
        let toggles = only(&[JurisdictionKey::California, JurisdictionKey::Eu]);
        assert_eq!(should_hide_consent_tool(&registry, &toggles, &denver), Ok(true));

        let toggles = only(&[JurisdictionKey::Colorado]);
        assert_eq!(should_hide_consent_tool(&registry, &toggles, &denver), Ok(false));
    }

    #[test]
    fn test_eu_visitor_shown_when_eu_on() {
        let registry = JurisdictionRegistry::standard();
        let toggles = only(&[JurisdictionKey::Eu]);
        let germany = LocationRecord {
            city: Some("Berlin".to_string()),
            region: Some("Land Berlin".to_string()),
            country: Some("Germany".to_string()),
        };
        assert_eq!(should_hide_consent_tool(&registry, &toggles, &germany), Ok(false));
    }

    #[test]
    fn test_visitor_outside_every_jurisdiction_hidden() {
        let registry = JurisdictionRegistry::standard();
        let brazil = LocationRecord {
            city: Some("São Paulo".to_string()),
            region: Some("Sao Paulo".to_string()),
            country: Some("Brazil".to_string()),
        };
        assert_eq!(should_hide_consent_tool(&registry, &all_on(), &brazil), Ok(true));
    }

    #[test]
    fn test_region_unknown_matches_every_state() {
        // Known country, unknown region: inside the UK and every US state
        let registry = JurisdictionRegistry::standard();
        let uk_only = only(&[JurisdictionKey::Uk]);
        assert_eq!(
            should_hide_consent_tool(&registry, &uk_only, &country("United Kingdom")),
            Ok(true)
        );
    }

    #[test]
    fn test_empty_registry_hides() {
        let registry = JurisdictionRegistry::new(Vec::new()).expect("valid");
        assert_eq!(
            should_hide_consent_tool(&registry, &all_on(), &LocationRecord::default()),
            Ok(true)
        );
    }
}
