//! Application layer for Lounge
//!
//! Pure state machine and generic runtime for browsing lounges and toggling
//! membership, enabling deterministic simulation testing with the same code
//! that runs in production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (navigation, lounge cards, session)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop executing actions against a
//!   [`lounge_client::Backend`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod route;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use event::AppEvent;
pub use route::{LoungeQuery, Route};
pub use runtime::Runtime;
pub use state::{LoadStatus, LoungeCard};
