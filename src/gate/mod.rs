//! Consent gate.
//!
//! Combines the jurisdiction toggles, role and troubleshooting overrides and
//! the delivery mode into the final decision on whether the consent script
//! is emitted. An unknown location counts as a member of every jurisdiction,
//! so it is shown only while every jurisdiction is toggled on.

mod engine;
mod hide;
mod policy;
mod response;

// Re-export public API
pub use engine::ConsentGate;
pub use hide::should_hide_consent_tool;
pub use policy::{GatePolicy, RenderDecision, SuppressReason};
pub use response::{LookupData, LookupResponse, RenderDecisionBody};
