//! Deterministic simulation harness for lounge testing.
//!
//! A scripted [`SimDriver`] runs the production [`lounge_app::Runtime`]
//! against the in-memory backend, so the same orchestration code is exercised
//! in tests as in the terminal client.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of one lounge
//! card's membership toggle. Operations are applied to both the model and
//! the real state machine, and their observable states are compared.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for the common
//! App invariants.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod model;
pub mod sim_driver;

pub use invariants::{
    AppSnapshot, CardSnapshot, CardsMatchRoute, Invariant, InvariantKind, InvariantRegistry,
    InvariantResult, LoadingMatchesPending, OptimisticTarget, Violation,
};
pub use model::{ModelOutcome, ToggleModel, ToggleOp};
pub use sim_driver::{SimDriver, SimDriverError};
