//! Jurisdictions and visitor classification.
//!
//! The registry is a fixed table of privacy jurisdictions, each paired with
//! exactly one classification rule. Classification treats an unresolved
//! location as potentially being anywhere.

mod classify;
mod registry;

// Re-export public API
pub use classify::{classify_all, is_in_jurisdiction, matches};
pub use registry::{
    Classification, CustomPredicate, Jurisdiction, JurisdictionKey, JurisdictionRegistry,
    EU_EEA_COUNTRIES,
};
