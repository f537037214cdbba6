//! Jurisdiction registry.
//!
//! To support a new US state, add a key variant and a `RegionMatch` entry to
//! [`JurisdictionRegistry::standard`].

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error_handling::ClassificationError;

/// Countries of the European Union and the European Economic Area.
///
/// The United Kingdom is not a member; it has its own jurisdiction.
pub const EU_EEA_COUNTRIES: &[&str] = &[
    "Austria",
    "Belgium",
    "Bulgaria",
    "Croatia",
    "Cyprus",
    "Czech Republic",
    "Denmark",
    "Estonia",
    "Finland",
    "France",
    "Germany",
    "Greece",
    "Hungary",
    "Ireland",
    "Italy",
    "Latvia",
    "Lithuania",
    "Luxembourg",
    "Malta",
    "Netherlands",
    "Poland",
    "Portugal",
    "Romania",
    "Slovakia",
    "Slovenia",
    "Spain",
    "Sweden",
    "Norway",
    "Iceland",
    "Liechtenstein",
];

/// Stable identifier of a jurisdiction.
///
/// The lowercase string form (`eu`, `california`, ...) is used in settings
/// keys, debug payloads and the location override parameter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JurisdictionKey {
    Eu,
    Uk,
    Canada,
    California,
    Colorado,
    Connecticut,
    Oregon,
    Texas,
    Utah,
    Virginia,
}

impl JurisdictionKey {
    /// Parses a key, reporting unknown keys as a configuration error.
    pub fn parse(raw: &str) -> Result<Self, ClassificationError> {
        Self::from_str(raw.trim()).map_err(|_| ClassificationError::UnknownKey(raw.to_string()))
    }
}

/// Bespoke membership predicates that are not a single country or region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomPredicate {
    /// Country is a member of [`EU_EEA_COUNTRIES`].
    EuEea,
}

/// How a location is matched against a jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Country name equals the value.
    CountryMatch(&'static str),
    /// Region (first subdivision) name equals `region`.
    ///
    /// Only the region is compared; `country` is descriptive.
    RegionMatch {
        /// Country the region belongs to
        country: &'static str,
        /// Subdivision name as reported by the database
        region: &'static str,
    },
    /// A bespoke predicate.
    Custom(CustomPredicate),
}

/// A configured privacy jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jurisdiction {
    pub key: JurisdictionKey,
    pub display_name: &'static str,
    /// Shown first in settings listings
    pub popular: bool,
    /// Display grouping, e.g. "United States of America"
    pub section: Option<&'static str>,
    pub classification: Classification,
}

impl Jurisdiction {
    fn country(
        key: JurisdictionKey,
        display_name: &'static str,
        popular: bool,
        country: &'static str,
    ) -> Self {
        Self {
            key,
            display_name,
            popular,
            section: None,
            classification: Classification::CountryMatch(country),
        }
    }

    fn us_state(
        key: JurisdictionKey,
        display_name: &'static str,
        popular: bool,
        state: &'static str,
    ) -> Self {
        Self {
            key,
            display_name,
            popular,
            section: Some(US_SECTION),
            classification: Classification::RegionMatch {
                country: "United States",
                region: state,
            },
        }
    }
}

const US_SECTION: &str = "United States of America";

/// Immutable, ordered table of jurisdictions.
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    entries: Vec<Jurisdiction>,
}

impl JurisdictionRegistry {
    /// Builds a registry, rejecting duplicate keys.
    pub fn new(entries: Vec<Jurisdiction>) -> Result<Self, ClassificationError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key) {
                return Err(ClassificationError::DuplicateKey(entry.key.to_string()));
            }
        }
        Ok(Self { entries })
    }

    /// The supported jurisdictions, in display order.
    pub fn standard() -> Self {
        use JurisdictionKey::*;
        Self {
            entries: vec![
                Jurisdiction {
                    key: Eu,
                    display_name: "European Union & European Economic Area (GDPR)",
                    popular: true,
                    section: None,
                    classification: Classification::Custom(CustomPredicate::EuEea),
                },
                Jurisdiction::country(Uk, "United Kingdom (UK DPA)", true, "United Kingdom"),
                Jurisdiction::country(Canada, "Canada (PIPEDA, Quebec 25)", true, "Canada"),
                Jurisdiction::us_state(California, "California (CPRA, CIPA)", true, "California"),
                Jurisdiction::us_state(Colorado, "Colorado (CPA)", false, "Colorado"),
                Jurisdiction::us_state(Connecticut, "Connecticut (CTDPA)", false, "Connecticut"),
                Jurisdiction::us_state(Oregon, "Oregon (OCPA)", false, "Oregon"),
                Jurisdiction::us_state(Texas, "Texas (TDPSA)", false, "Texas"),
                Jurisdiction::us_state(Utah, "Utah (UCPA)", false, "Utah"),
                Jurisdiction::us_state(Virginia, "Virginia (VCDPA)", false, "Virginia"),
            ],
        }
    }

    /// Looks up a registered jurisdiction.
    pub fn get(&self, key: JurisdictionKey) -> Result<&Jurisdiction, ClassificationError> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .ok_or_else(|| ClassificationError::NotRegistered(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Jurisdiction> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = JurisdictionKey> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JurisdictionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_standard_registry_covers_every_key() {
        let registry = JurisdictionRegistry::standard();
        for key in JurisdictionKey::iter() {
            assert!(registry.get(key).is_ok(), "{} should be registered", key);
        }
        assert_eq!(registry.len(), JurisdictionKey::iter().count());
    }

    #[test]
    fn test_key_string_forms() {
        assert_eq!(JurisdictionKey::Eu.to_string(), "eu");
        assert_eq!(JurisdictionKey::California.as_ref(), "california");
        assert_eq!(JurisdictionKey::parse("Texas"), Ok(JurisdictionKey::Texas));
        assert_eq!(JurisdictionKey::parse(" uk "), Ok(JurisdictionKey::Uk));
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        let err = JurisdictionKey::parse("atlantis").unwrap_err();
        assert_eq!(err, ClassificationError::UnknownKey("atlantis".to_string()));
        assert!(err.to_string().contains("atlantis"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let uk = JurisdictionRegistry::standard()
            .get(JurisdictionKey::Uk)
            .cloned()
            .expect("uk registered");
        let result = JurisdictionRegistry::new(vec![uk.clone(), uk]);
        assert_eq!(
            result.unwrap_err(),
            ClassificationError::DuplicateKey("uk".to_string())
        );
    }

    #[test]
    fn test_unregistered_key_reported() {
        let registry = JurisdictionRegistry::new(Vec::new()).expect("empty registry is valid");
        assert!(registry.is_empty());
        assert_eq!(
            registry.get(JurisdictionKey::Oregon).unwrap_err(),
            ClassificationError::NotRegistered("oregon".to_string())
        );
    }

    #[test]
    fn test_us_states_grouped_in_section() {
        let registry = JurisdictionRegistry::standard();
        let virginia = registry.get(JurisdictionKey::Virginia).expect("registered");
        assert_eq!(virginia.section, Some("United States of America"));
        assert!(!virginia.popular);
        assert_eq!(registry.get(JurisdictionKey::Eu).expect("registered").section, None);
    }

    #[test]
    fn test_united_kingdom_not_in_eu_list() {
        assert!(!EU_EEA_COUNTRIES.contains(&"United Kingdom"));
        assert!(EU_EEA_COUNTRIES.contains(&"Norway"));
        assert_eq!(EU_EEA_COUNTRIES.len(), 30);
    }
}
