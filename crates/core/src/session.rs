// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::Identity;
use tracing::debug;

/// A callback invoked with the new identity whenever it changes.
pub type IdentityObserver = Box<dyn FnMut(Option<&Identity>) + Send>;

/// An explicit handle for one identity subscription.
///
/// Handles are returned by [`SessionContext::subscribe`] and must be passed
/// back to [`SessionContext::unsubscribe`] when the observing session ends,
/// so that notifications never reach a disposed observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// The single source of truth for the authenticated identity.
///
/// The context is shared read-mostly state: only the authentication
/// collaborator writes it (on login, logout, or refresh), and every write
/// replaces the snapshot wholesale and notifies all subscribed observers
/// before returning.
pub struct SessionContext {
    /// The current identity, if signed in.
    current: Option<Identity>,
    /// Subscribed observers, keyed by handle id.
    observers: Vec<(u64, IdentityObserver)>,
    /// The next handle id to hand out.
    next_handle: u64,
}

impl SessionContext {
    /// Creates a signed-out context with no observers.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: None,
            observers: Vec::new(),
            next_handle: 0,
        }
    }

    /// The current identity snapshot, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Signs an identity in, replacing any previous one.
    pub fn sign_in(&mut self, identity: Identity) {
        self.replace(Some(identity));
    }

    /// Signs the current identity out.
    pub fn sign_out(&mut self) {
        self.replace(None);
    }

    /// Replaces the identity wholesale (e.g. after a role change).
    pub fn refresh(&mut self, identity: Option<Identity>) {
        self.replace(identity);
    }

    /// Registers an observer and returns its subscription handle.
    ///
    /// The observer is not invoked with the current identity at
    /// subscription time; it only sees subsequent changes.
    pub fn subscribe(&mut self, observer: IdentityObserver) -> SubscriptionHandle {
        let id: u64 = self.next_handle;
        self.next_handle += 1;
        self.observers.push((id, observer));
        debug!(handle = id, observers = self.observers.len(), "Identity observer subscribed");
        SubscriptionHandle(id)
    }

    /// Removes an observer by handle.
    ///
    /// Returns whether a subscription was actually removed; unsubscribing
    /// twice is harmless.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before: usize = self.observers.len();
        self.observers.retain(|(id, _)| *id != handle.0);
        let removed: bool = self.observers.len() != before;
        debug!(handle = handle.0, removed, "Identity observer unsubscribed");
        removed
    }

    /// The number of live subscriptions.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn replace(&mut self, identity: Option<Identity>) {
        debug!(
            signed_in = identity.is_some(),
            observers = self.observers.len(),
            "Replacing identity snapshot"
        );
        self.current = identity;
        let current: Option<Identity> = self.current.clone();
        for (_, observer) in &mut self.observers {
            observer(current.as_ref());
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}
