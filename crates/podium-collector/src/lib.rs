//! # podium-collector
//!
//! **Collect plane**: turns operator input into a validated [`MatchOutcome`].
//!
//! ## Architecture
//!
//! Operator edits arrive as [`CollectorEvent`]s and are folded into a
//! [`CollectorState`] by the pure [`reduce`] function. Validation is derived
//! from state by [`validate`], never tracked separately, so the UI can gate
//! submission after every event:
//!
//! ```text
//! UI event → reduce(state, event) → state' → validate(state') → [] ⇒ finalize() → MatchOutcome
//! ```
//!
//! Incomplete input is reported as data ([`Violation`]s), not as an error.
//! Only [`finalize`] on an incomplete state fails.
//!
//! [`MatchOutcome`]: podium_types::MatchOutcome
//! [`Violation`]: podium_types::Violation

pub mod collector;
pub mod validation;

pub use collector::{CollectorEvent, CollectorState, OutcomeCollector, Selections, reduce};
pub use validation::{CollectorStatus, finalize, status, validate};
