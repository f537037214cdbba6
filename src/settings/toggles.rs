//! Per-jurisdiction visibility toggles.

use std::collections::BTreeMap;

use crate::jurisdiction::{JurisdictionKey, JurisdictionRegistry};

use super::store::{Setting, SettingsStore};

/// Snapshot of the per-jurisdiction "show in" flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JurisdictionToggleSet {
    show_in: BTreeMap<JurisdictionKey, bool>,
}

impl JurisdictionToggleSet {
    /// Reads the toggles of every registered jurisdiction.
    pub fn load(settings: &dyn SettingsStore, registry: &JurisdictionRegistry) -> Self {
        Self {
            show_in: registry
                .keys()
                .map(|key| (key, settings.flag(Setting::ShowIn(key))))
                .collect(),
        }
    }

    /// Builds a toggle set from explicit values; unlisted jurisdictions are off.
    pub fn new(show_in: impl IntoIterator<Item = (JurisdictionKey, bool)>) -> Self {
        Self {
            show_in: show_in.into_iter().collect(),
        }
    }

    /// Whether the consent tool is shown to visitors in the jurisdiction.
    pub fn is_shown_in(&self, key: JurisdictionKey) -> bool {
        self.show_in.get(&key).copied().unwrap_or(false)
    }

    /// Whether any jurisdiction is toggled on.
    pub fn any_shown(&self) -> bool {
        self.show_in.values().any(|shown| *shown)
    }
}
