// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{CommandGates, EditorSignals, ReservationStore, StoreError};
use tablebook_domain::{
    DiningTable, DomainError, Identity, Reservation, ReservationStatus, Role,
};
use time::macros::datetime;

/// An in-memory reservation store with controllable failure modes.
pub struct MemoryStore {
    pub tables: Vec<DiningTable>,
    pub reservations: Vec<Reservation>,
    next_id: i64,
    pub get_calls: usize,
    pub create_calls: usize,
    pub update_calls: usize,
    pub delete_calls: usize,
    /// Mutations return `Ok(false)` (e.g. a booking conflict).
    pub reject_writes: bool,
    /// Mutations raise an unexpected fault.
    pub fail_writes: bool,
    /// Reads raise an unexpected fault once `get_calls` exceeds this.
    pub fail_get_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: vec![
                DiningTable::new(1, String::from("Window 1"), 2),
                DiningTable::new(2, String::from("Booth 4"), 6),
            ],
            reservations: Vec::new(),
            next_id: 1,
            get_calls: 0,
            create_calls: 0,
            update_calls: 0,
            delete_calls: 0,
            reject_writes: false,
            fail_writes: false,
            fail_get_after: None,
        }
    }

    /// Seeds a reservation and returns its assigned id.
    pub fn seed_reservation(&mut self, owner_user_id: i64, status: ReservationStatus) -> i64 {
        let id: i64 = self.next_id;
        self.next_id += 1;
        self.reservations.push(Reservation {
            id,
            table_id: 1,
            owner_user_id,
            starts_at: datetime!(2026-08-10 18:00),
            ends_at: datetime!(2026-08-10 20:00),
            status,
        });
        id
    }

    pub fn reservation(&self, id: i64) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }
}

impl ReservationStore for MemoryStore {
    fn get_reservation(&mut self, reservation_id: i64) -> Result<Option<Reservation>, StoreError> {
        self.get_calls += 1;
        if let Some(limit) = self.fail_get_after {
            if self.get_calls > limit {
                return Err(StoreError::Backend(String::from("read failed")));
            }
        }
        Ok(self.reservation(reservation_id).cloned())
    }

    fn list_tables(&mut self) -> Result<Vec<DiningTable>, StoreError> {
        Ok(self.tables.clone())
    }

    fn create_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError> {
        self.create_calls += 1;
        if self.fail_writes {
            return Err(StoreError::Backend(String::from("write failed")));
        }
        if self.reject_writes {
            return Ok(false);
        }
        let mut stored: Reservation = reservation.clone();
        stored.id = self.next_id;
        self.next_id += 1;
        self.reservations.push(stored);
        Ok(true)
    }

    fn update_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError> {
        self.update_calls += 1;
        if self.fail_writes {
            return Err(StoreError::Backend(String::from("write failed")));
        }
        if self.reject_writes {
            return Ok(false);
        }
        match self.reservations.iter_mut().find(|r| r.id == reservation.id) {
            Some(existing) => {
                *existing = reservation.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_reservation(&mut self, reservation_id: i64) -> Result<bool, StoreError> {
        self.delete_calls += 1;
        if self.fail_writes {
            return Err(StoreError::Backend(String::from("write failed")));
        }
        if self.reject_writes {
            return Ok(false);
        }
        let before: usize = self.reservations.len();
        self.reservations.retain(|r| r.id != reservation_id);
        Ok(self.reservations.len() != before)
    }
}

/// A presentation signal captured by [`SignalRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    ValidationFailed(DomainError),
    PermissionDenied,
    NotFound,
    SignInRequired,
    PersistenceFailed,
    OperationFailed,
    Success,
    NavigatedBack,
}

/// An [`EditorSignals`] sink recording everything the editor emits.
pub struct SignalRecorder {
    pub signals: Vec<Signal>,
    pub gates_history: Vec<CommandGates>,
    pub confirm: bool,
}

impl SignalRecorder {
    pub fn new() -> Self {
        Self {
            signals: Vec::new(),
            gates_history: Vec::new(),
            confirm: true,
        }
    }

    pub fn declining() -> Self {
        Self {
            confirm: false,
            ..Self::new()
        }
    }

    pub fn contains(&self, signal: &Signal) -> bool {
        self.signals.contains(signal)
    }

    pub fn last_gates(&self) -> CommandGates {
        self.gates_history.last().copied().unwrap_or_default()
    }
}

impl EditorSignals for SignalRecorder {
    fn report_validation_failure(&mut self, failure: &DomainError) {
        self.signals.push(Signal::ValidationFailed(failure.clone()));
    }

    fn report_permission_denied(&mut self) {
        self.signals.push(Signal::PermissionDenied);
    }

    fn report_not_found(&mut self) {
        self.signals.push(Signal::NotFound);
    }

    fn report_sign_in_required(&mut self) {
        self.signals.push(Signal::SignInRequired);
    }

    fn report_persistence_failure(&mut self) {
        self.signals.push(Signal::PersistenceFailed);
    }

    fn report_operation_failed(&mut self) {
        self.signals.push(Signal::OperationFailed);
    }

    fn report_success(&mut self) {
        self.signals.push(Signal::Success);
    }

    fn request_confirmation(&mut self) -> bool {
        self.confirm
    }

    fn navigate_back(&mut self) {
        self.signals.push(Signal::NavigatedBack);
    }

    fn commands_changed(&mut self, gates: CommandGates) {
        self.gates_history.push(gates);
    }
}

pub fn customer(id: i64) -> Identity {
    Identity::new(id, Role::Customer)
}

pub fn staff(id: i64) -> Identity {
    Identity::new(id, Role::Staff)
}

pub fn admin(id: i64) -> Identity {
    Identity::new(id, Role::Admin)
}
