//! Lounge core
//!
//! Domain types and the membership toggle state machine.
//!
//! # Architecture
//!
//! Everything here is Sans-IO. The store and identity provider live behind
//! the traits in `lounge-client`; this crate only describes what to ask them
//! for and how local state reacts to their answers.
//!
//! # Components
//!
//! - [`MembershipToggle`]: per-card optimistic join/leave state machine
//! - [`Lounge`], [`Membership`]: store rows
//! - [`Identity`], [`SessionState`]: session passed explicitly into operations
//! - [`Notification`]: transient user feedback

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod ids;
mod lounge;
mod notification;
mod session;
pub mod toggle;

pub use error::ToggleError;
pub use ids::{LoungeId, UserId};
pub use lounge::{Lounge, Membership};
pub use notification::{Notification, NotificationLevel};
pub use session::{Identity, SessionState};
pub use toggle::{
    MembershipIntent, MembershipToggle, MutationRequest, Ticket, ToggleAction, ToggleState,
};
