// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::gating::CommandGates;
use tablebook_domain::DomainError;

/// The presentation capability consumed by the editing state machine.
///
/// The editor emits abstract outcomes through this contract and leaves
/// rendering and dialog mechanics to the caller. Validation failures carry
/// their specific kind; permission, persistence, and unexpected failures
/// are deliberately generic.
pub trait EditorSignals {
    /// A draft failed local validation; the store was not contacted.
    fn report_validation_failure(&mut self, failure: &DomainError);

    /// The acting identity may not perform the attempted command.
    fn report_permission_denied(&mut self);

    /// The requested reservation does not exist.
    fn report_not_found(&mut self);

    /// Creating a reservation requires a signed-in identity.
    fn report_sign_in_required(&mut self);

    /// The store rejected the operation (for example a booking conflict).
    fn report_persistence_failure(&mut self);

    /// An unexpected fault occurred; the operation did not complete.
    fn report_operation_failed(&mut self);

    /// The operation completed successfully.
    fn report_success(&mut self);

    /// Asks the caller to confirm a destructive action.
    fn request_confirmation(&mut self) -> bool;

    /// The editing session is finished; the caller should leave the screen.
    fn navigate_back(&mut self);

    /// Command availability changed; published after every transition.
    fn commands_changed(&mut self, gates: CommandGates);
}
