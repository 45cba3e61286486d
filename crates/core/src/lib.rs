// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The reservation authorization and editing-state engine.
//!
//! This crate owns the rules that decide who may view versus mutate a
//! reservation, the validation run before anything is persisted, and the
//! editing state machine whose busy flag gates re-entrancy. Persistence
//! and presentation are consumed through the [`ReservationStore`] and
//! [`EditorSignals`] contracts; the authenticated identity flows in from
//! a shared [`SessionContext`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod editing_session;
mod editor;
mod error;
mod gating;
mod permissions;
mod session;
mod signals;
mod store;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use editing_session::EditingSession;
pub use editor::ReservationEditor;
pub use error::StoreError;
pub use gating::CommandGates;
pub use permissions::{PermissionSnapshot, evaluate};
pub use session::{IdentityObserver, SessionContext, SubscriptionHandle};
pub use signals::EditorSignals;
pub use store::ReservationStore;
