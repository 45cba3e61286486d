// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A signal sink that records what the core editor emits.
//!
//! The HTTP layer has no dialogs to show, so each request drives the
//! editor against a [`SignalLog`] and translates the recorded signals
//! into API errors afterwards. Confirmation prompts are answered from a
//! preset supplied by the caller.

use tablebook::{CommandGates, EditorSignals};
use tablebook_domain::DomainError;

/// One recorded presentation signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorSignal {
    /// A draft failed local validation.
    ValidationFailed(DomainError),
    /// The acting identity may not perform the command.
    PermissionDenied,
    /// The requested reservation does not exist.
    NotFound,
    /// A signed-in identity is required.
    SignInRequired,
    /// The store rejected the operation.
    PersistenceFailed,
    /// An unexpected fault occurred.
    OperationFailed,
    /// The operation completed.
    Success,
    /// The editor asked the caller to leave the screen.
    NavigatedBack,
}

/// An [`EditorSignals`] implementation that records every signal.
pub struct SignalLog {
    events: Vec<EditorSignal>,
    latest_gates: CommandGates,
    confirm: bool,
}

impl SignalLog {
    /// Creates a log whose confirmation prompts answer `confirm`.
    #[must_use]
    pub const fn new(confirm: bool) -> Self {
        Self {
            events: Vec::new(),
            latest_gates: CommandGates::closed(),
            confirm,
        }
    }

    /// Every recorded signal, in emission order.
    #[must_use]
    pub fn events(&self) -> &[EditorSignal] {
        &self.events
    }

    /// Discards recorded signals (gates are kept).
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// The most recently published command gates.
    #[must_use]
    pub const fn latest_gates(&self) -> CommandGates {
        self.latest_gates
    }

    /// The recorded validation failure, if any.
    #[must_use]
    pub fn validation_failure(&self) -> Option<&DomainError> {
        self.events.iter().find_map(|event| match event {
            EditorSignal::ValidationFailed(failure) => Some(failure),
            _ => None,
        })
    }

    /// Whether the operation reported success.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.events.contains(&EditorSignal::Success)
    }

    /// Whether a permission denial was recorded.
    #[must_use]
    pub fn was_permission_denied(&self) -> bool {
        self.events.contains(&EditorSignal::PermissionDenied)
    }

    /// Whether a not-found condition was recorded.
    #[must_use]
    pub fn was_not_found(&self) -> bool {
        self.events.contains(&EditorSignal::NotFound)
    }

    /// Whether a sign-in-required condition was recorded.
    #[must_use]
    pub fn was_sign_in_required(&self) -> bool {
        self.events.contains(&EditorSignal::SignInRequired)
    }

    /// Whether the store rejected the operation.
    #[must_use]
    pub fn was_persistence_failure(&self) -> bool {
        self.events.contains(&EditorSignal::PersistenceFailed)
    }

    /// Whether an unexpected fault was recorded.
    #[must_use]
    pub fn was_operation_failed(&self) -> bool {
        self.events.contains(&EditorSignal::OperationFailed)
    }
}

impl EditorSignals for SignalLog {
    fn report_validation_failure(&mut self, failure: &DomainError) {
        self.events.push(EditorSignal::ValidationFailed(failure.clone()));
    }

    fn report_permission_denied(&mut self) {
        self.events.push(EditorSignal::PermissionDenied);
    }

    fn report_not_found(&mut self) {
        self.events.push(EditorSignal::NotFound);
    }

    fn report_sign_in_required(&mut self) {
        self.events.push(EditorSignal::SignInRequired);
    }

    fn report_persistence_failure(&mut self) {
        self.events.push(EditorSignal::PersistenceFailed);
    }

    fn report_operation_failed(&mut self) {
        self.events.push(EditorSignal::OperationFailed);
    }

    fn report_success(&mut self) {
        self.events.push(EditorSignal::Success);
    }

    fn request_confirmation(&mut self) -> bool {
        self.confirm
    }

    fn navigate_back(&mut self) {
        self.events.push(EditorSignal::NavigatedBack);
    }

    fn commands_changed(&mut self, gates: CommandGates) {
        self.latest_gates = gates;
    }
}
