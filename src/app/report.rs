//! Output of the `lookup` command.

use std::collections::BTreeMap;
use std::fmt;

use colored::*;
use serde::Serialize;

use crate::jurisdiction::JurisdictionKey;

/// Location and jurisdiction membership of a single address.
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub ip: String,
    pub location: String,
    pub hide: bool,
    pub jurisdictions: BTreeMap<JurisdictionKey, bool>,
    /// Reader errors hit while resolving the address
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.ip.bold(), self.location)?;
        let decision = if self.hide {
            "hidden".red()
        } else {
            "shown".green()
        };
        writeln!(f, "  consent tool: {}", decision)?;
        for (key, member) in &self.jurisdictions {
            let mark = if *member { "yes".green() } else { "no".dimmed() };
            writeln!(f, "  {:<12} {}", key.to_string(), mark)?;
        }
        for error in &self.errors {
            writeln!(f, "  {}", error.yellow())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_jurisdiction() {
        colored::control::set_override(false);
        let report = LookupReport {
            ip: "217.61.20.213".to_string(),
            location: "London, England United Kingdom".to_string(),
            hide: false,
            jurisdictions: BTreeMap::from([
                (JurisdictionKey::Uk, true),
                (JurisdictionKey::Eu, false),
            ]),
            errors: Vec::new(),
        };
        let text = report.to_string();
        assert!(text.starts_with("217.61.20.213 London, England United Kingdom\n"));
        assert!(text.contains("consent tool: shown"));
        assert_eq!(text.lines().count(), 4);
    }
}
