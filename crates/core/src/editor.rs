// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::StoreError;
use crate::gating::CommandGates;
use crate::permissions::{PermissionSnapshot, evaluate};
use crate::signals::EditorSignals;
use crate::store::ReservationStore;
use tablebook_domain::{
    DiningTable, Identity, Reservation, ReservationDraft, ReservationStatus, validate_draft,
};
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{debug, warn};

/// Sentinel owner id while no record has been loaded.
const OWNER_UNKNOWN: i64 = -1;

/// How a load attempt concluded.
enum LoadOutcome {
    /// The editor holds a usable draft.
    Ready,
    /// The session cannot continue (record missing or sign-in required).
    Abandoned,
}

/// The reservation editing state machine.
///
/// One editor drives one reservation-editing session through
/// load → edit → save/delete. The busy flag is the mutual-exclusion gate:
/// every operation acquires it on entry, releases it on every exit path,
/// and rejects re-entrant calls as no-ops. After each transition the
/// permission snapshot is re-derived and the command gates are republished
/// through the signal sink, so the caller always sees the settled state.
///
/// Collaborators are passed per call as `&mut dyn` so the editor itself
/// stays free of persistence and presentation concerns.
pub struct ReservationEditor {
    /// The reservation being edited (zero for a new record).
    reservation_id: i64,
    /// The working copy of the reservation.
    draft: ReservationDraft,
    /// Tables available for selection, loaded during initialize.
    tables: Vec<DiningTable>,
    /// The owner recorded on the loaded reservation, or [`OWNER_UNKNOWN`].
    owner_user_id: i64,
    /// The latest identity snapshot pushed into this editor.
    identity: Option<Identity>,
    /// The derived authorization state.
    permissions: PermissionSnapshot,
    /// The status the reservation had when it was loaded.
    loaded_status: ReservationStatus,
    /// An operation is in flight; mutating commands are disabled.
    busy: bool,
    /// True until the first successful load completes.
    initial_load: bool,
    /// The editor holds an already-persisted record.
    existing: bool,
}

impl ReservationEditor {
    /// Creates an uninitialized editor.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reservation_id: 0,
            draft: ReservationDraft::with_defaults(Self::now(), None, OWNER_UNKNOWN),
            tables: Vec::new(),
            owner_user_id: OWNER_UNKNOWN,
            identity: None,
            permissions: PermissionSnapshot::none(),
            loaded_status: ReservationStatus::Pending,
            busy: false,
            initial_load: true,
            existing: false,
        }
    }

    /// Loads the editing session.
    ///
    /// No-op if an operation is in flight or the initial load already
    /// completed. Permissions are reset to the fail-closed default for the
    /// duration of the load and re-derived once more after the busy flag
    /// clears, so command gating reflects the settled state rather than
    /// the mid-load state.
    ///
    /// With `reservation_id > 0` the existing record is loaded; a missing
    /// record emits a not-found signal and asks the caller to navigate
    /// away. With `reservation_id == 0` a signed-in identity is required
    /// and the draft is populated with creation defaults.
    ///
    /// # Arguments
    ///
    /// * `store` - The persistence collaborator
    /// * `signals` - The presentation collaborator
    /// * `reservation_id` - The record to edit, or zero for a new one
    /// * `identity` - The current identity snapshot
    pub fn initialize(
        &mut self,
        store: &mut dyn ReservationStore,
        signals: &mut dyn EditorSignals,
        reservation_id: i64,
        identity: Option<&Identity>,
    ) {
        if self.busy || !self.initial_load {
            debug!(
                reservation_id,
                busy = self.busy,
                initial_load = self.initial_load,
                "Ignoring re-entrant initialize"
            );
            return;
        }

        debug!(reservation_id, "Initializing reservation editor");
        self.reservation_id = reservation_id;
        self.existing = reservation_id > 0;
        self.identity = identity.cloned();
        self.busy = true;
        self.permissions = PermissionSnapshot::none();
        self.publish_gates(signals);

        let outcome: Result<LoadOutcome, StoreError> = self.load(store, signals);

        // The settle pass: gating depends on the busy flag, so permissions
        // are re-derived once more after it clears.
        self.busy = false;
        self.refresh_permissions();
        self.publish_gates(signals);

        match outcome {
            Ok(LoadOutcome::Ready) => {
                self.initial_load = false;
                debug!(
                    reservation_id,
                    owner_user_id = self.owner_user_id,
                    can_manage = self.permissions.can_manage,
                    "Editor initialized"
                );
            }
            Ok(LoadOutcome::Abandoned) => {
                signals.navigate_back();
            }
            Err(err) => {
                warn!(error = %err, reservation_id, "Reservation load failed");
                signals.report_operation_failed();
            }
        }
    }

    /// Reacts to an identity change pushed by the session context.
    ///
    /// Recomputes the permission snapshot against the stored owner and
    /// republishes the command gates. Idempotent; never re-triggers a
    /// data load.
    pub fn on_identity_changed(
        &mut self,
        signals: &mut dyn EditorSignals,
        identity: Option<&Identity>,
    ) {
        self.identity = identity.cloned();
        self.refresh_permissions();
        debug!(
            signed_in = self.identity.is_some(),
            can_manage = self.permissions.can_manage,
            "Identity changed, permissions re-derived"
        );
        self.publish_gates(signals);
    }

    /// Validates and persists the draft.
    ///
    /// No-op while busy. Manage permission is re-checked at execution time
    /// with the current identity — the identity may have changed between
    /// command dispatch and execution — and the save aborts with a
    /// permission-denied signal if it was lost. Validation failures are
    /// reported without contacting the store. The busy flag is released
    /// and permissions re-derived on every exit path.
    pub fn save(&mut self, store: &mut dyn ReservationStore, signals: &mut dyn EditorSignals) {
        if self.busy {
            debug!("Ignoring save while busy");
            return;
        }

        self.refresh_permissions();
        if !self.permissions.can_manage {
            debug!("Save attempted without manage permission");
            signals.report_permission_denied();
            return;
        }

        self.busy = true;
        self.publish_gates(signals);

        let outcome: Result<(), StoreError> = self.perform_save(store, signals);

        self.busy = false;
        self.refresh_permissions();
        self.publish_gates(signals);

        if let Err(err) = outcome {
            warn!(error = %err, reservation_id = self.reservation_id, "Saving reservation failed");
            signals.report_operation_failed();
        }
    }

    /// Deletes the loaded reservation after caller confirmation.
    ///
    /// No-op while busy. Requires manage permission and a persisted
    /// record, re-checked at execution time. Aborts silently if the
    /// caller declines the confirmation prompt.
    pub fn delete(&mut self, store: &mut dyn ReservationStore, signals: &mut dyn EditorSignals) {
        if self.busy {
            debug!("Ignoring delete while busy");
            return;
        }

        self.refresh_permissions();
        if !self.permissions.can_manage || !self.existing {
            debug!(
                existing = self.existing,
                "Delete attempted without permission"
            );
            signals.report_permission_denied();
            return;
        }

        if !signals.request_confirmation() {
            debug!(reservation_id = self.reservation_id, "Delete declined");
            return;
        }

        self.busy = true;
        self.publish_gates(signals);

        let outcome: Result<(), StoreError> = self.perform_delete(store, signals);

        self.busy = false;
        self.refresh_permissions();
        self.publish_gates(signals);

        if let Err(err) = outcome {
            warn!(error = %err, reservation_id = self.reservation_id, "Deleting reservation failed");
            signals.report_operation_failed();
        }
    }

    /// The working draft.
    #[must_use]
    pub const fn draft(&self) -> &ReservationDraft {
        &self.draft
    }

    /// Mutable access to the working draft for table/date/time/status
    /// selection between initialize and save.
    pub fn draft_mut(&mut self) -> &mut ReservationDraft {
        &mut self.draft
    }

    /// The tables loaded for selection.
    #[must_use]
    pub fn tables(&self) -> &[DiningTable] {
        &self.tables
    }

    /// The current permission snapshot.
    #[must_use]
    pub const fn permissions(&self) -> &PermissionSnapshot {
        &self.permissions
    }

    /// The command gates derived from the live state.
    #[must_use]
    pub const fn gates(&self) -> CommandGates {
        CommandGates::derive(&self.permissions, self.busy, self.existing)
    }

    /// Whether an operation is in flight.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the editor holds a persisted record.
    #[must_use]
    pub const fn is_existing(&self) -> bool {
        self.existing
    }

    /// The owner recorded on the loaded reservation, or `-1`.
    #[must_use]
    pub const fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }

    /// The reservation id this editor was initialized with.
    #[must_use]
    pub const fn reservation_id(&self) -> i64 {
        self.reservation_id
    }

    fn load(
        &mut self,
        store: &mut dyn ReservationStore,
        signals: &mut dyn EditorSignals,
    ) -> Result<LoadOutcome, StoreError> {
        self.tables = store.list_tables()?;
        debug!(tables = self.tables.len(), "Loaded dining tables");

        if self.existing {
            let Some(reservation) = store.get_reservation(self.reservation_id)? else {
                debug!(reservation_id = self.reservation_id, "Reservation not found");
                signals.report_not_found();
                return Ok(LoadOutcome::Abandoned);
            };

            // Permissions depend on the owner, so derive them as soon as
            // the owner is known.
            self.owner_user_id = reservation.owner_user_id;
            self.refresh_permissions();
            self.loaded_status = reservation.status;
            self.draft = ReservationDraft::from_reservation(&reservation);
            Ok(LoadOutcome::Ready)
        } else {
            let Some(identity) = self.identity.clone() else {
                debug!("Cannot create a reservation without a signed-in identity");
                signals.report_sign_in_required();
                return Ok(LoadOutcome::Abandoned);
            };

            self.owner_user_id = identity.id;
            self.refresh_permissions();
            let first_table: Option<i64> = self.tables.first().map(|table| table.table_id);
            self.draft = ReservationDraft::with_defaults(Self::now(), first_table, identity.id);
            self.loaded_status = ReservationStatus::Pending;
            Ok(LoadOutcome::Ready)
        }
    }

    fn perform_save(
        &mut self,
        store: &mut dyn ReservationStore,
        signals: &mut dyn EditorSignals,
    ) -> Result<(), StoreError> {
        if let Err(failure) = validate_draft(&self.draft, self.existing, Self::now()) {
            debug!(failure = %failure, "Draft validation failed");
            signals.report_validation_failure(&failure);
            return Ok(());
        }

        let owner_user_id: i64 = if self.existing {
            self.owner_user_id
        } else {
            self.identity.as_ref().map_or(OWNER_UNKNOWN, |identity| identity.id)
        };
        if owner_user_id <= 0 {
            warn!(owner_user_id, "Resolved owner is invalid, aborting save");
            signals.report_operation_failed();
            return Ok(());
        }

        // Validation guarantees a selected table.
        let Some(table_id) = self.draft.table_id else {
            return Ok(());
        };

        let status: ReservationStatus = self.resolve_status(store);
        let reservation: Reservation = Reservation {
            id: self.reservation_id,
            table_id,
            owner_user_id,
            starts_at: self.draft.start_instant(),
            ends_at: self.draft.end_instant(),
            status,
        };

        let stored: bool = if self.existing {
            store.update_reservation(&reservation)?
        } else {
            store.create_reservation(&reservation)?
        };

        if stored {
            debug!(reservation_id = self.reservation_id, "Reservation saved");
            signals.report_success();
            signals.navigate_back();
        } else {
            debug!(
                reservation_id = self.reservation_id,
                "Store rejected the reservation"
            );
            signals.report_persistence_failure();
        }
        Ok(())
    }

    fn perform_delete(
        &mut self,
        store: &mut dyn ReservationStore,
        signals: &mut dyn EditorSignals,
    ) -> Result<(), StoreError> {
        let removed: bool = store.delete_reservation(self.reservation_id)?;

        if removed {
            debug!(reservation_id = self.reservation_id, "Reservation deleted");
            signals.report_success();
            signals.navigate_back();
        } else {
            debug!(
                reservation_id = self.reservation_id,
                "Store rejected the delete"
            );
            signals.report_persistence_failure();
        }
        Ok(())
    }

    /// Resolves the status to persist.
    ///
    /// New reservations always persist as Pending. Privileged editors
    /// persist the edited status. Everyone else keeps the reservation's
    /// current persisted status, re-fetched to avoid staleness; if that
    /// re-fetch fails the status captured at load time is kept instead.
    fn resolve_status(&mut self, store: &mut dyn ReservationStore) -> ReservationStatus {
        if !self.existing {
            return ReservationStatus::Pending;
        }
        if self.permissions.is_privileged {
            return self.draft.status;
        }
        match store.get_reservation(self.reservation_id) {
            Ok(Some(current)) => current.status,
            Ok(None) => {
                warn!(
                    reservation_id = self.reservation_id,
                    "Status re-fetch found no record, keeping loaded status"
                );
                self.loaded_status
            }
            Err(err) => {
                warn!(error = %err, "Status re-fetch failed, keeping loaded status");
                self.loaded_status
            }
        }
    }

    fn refresh_permissions(&mut self) {
        self.permissions = evaluate(self.identity.as_ref(), self.owner_user_id);
    }

    fn publish_gates(&self, signals: &mut dyn EditorSignals) {
        signals.commands_changed(self.gates());
    }

    fn now() -> PrimitiveDateTime {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(now.date(), now.time())
    }

    /// Forces the busy flag for re-entrancy tests.
    #[cfg(test)]
    pub(crate) fn force_busy(&mut self, busy: bool) {
        self.busy = busy;
    }
}

impl Default for ReservationEditor {
    fn default() -> Self {
        Self::new()
    }
}
