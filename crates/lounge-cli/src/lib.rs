//! Lounge CLI
//!
//! One-shot terminal client. Each invocation turns a [`Command`] into a
//! script of [`lounge_app::AppEvent`]s and runs it through the shared
//! [`lounge_app::Runtime`] with a [`TerminalDriver`] writing plain text.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod terminal;

pub use cli::{Cli, Command, Step};
pub use terminal::{TerminalDriver, TerminalError};
