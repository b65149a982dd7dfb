//! Client
//!
//! Boundary to the managed backend: the relational store holding lounges and
//! memberships, and the passwordless identity provider.
//!
//! # Components
//!
//! - [`MembershipStore`], [`IdentityProvider`]: async boundary traits
//! - [`MembershipMutator`]: join/leave passthrough used by the runtime
//! - [`RestBackend`]: production backend over HTTP
//! - [`MemoryBackend`]: in-process backend for tests and simulation
//! - [`ChaoticStore`]: fault injection wrapper for chaos tests

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod chaotic;
mod config;
mod error;
mod memory;
mod mutator;
mod rest;
mod store;

pub use chaotic::ChaoticStore;
pub use config::{BackendConfig, DEFAULT_BACKEND_URL};
pub use error::{AuthError, ConfigError, MutationError, StoreError};
pub use memory::MemoryBackend;
pub use mutator::MembershipMutator;
pub use rest::RestBackend;
pub use store::{Backend, IdentityProvider, MembershipStore};
