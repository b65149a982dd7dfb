//! Reference model for model-based testing.
//!
//! [`ToggleModel`] is a deliberately simple re-statement of how one lounge
//! card reacts to join/leave intents and mutation results. Property tests
//! drive it and the real [`lounge_core::MembershipToggle`] with the same
//! [`ToggleOp`] sequence and compare observable state after every step.

mod operation;
mod toggle;

pub use operation::ToggleOp;
pub use toggle::{ModelOutcome, ToggleModel};
