// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::StoreError;
use tablebook_domain::{DiningTable, Reservation};

/// The persistence capability consumed by the editing state machine.
///
/// Mutating operations return `Ok(true)` on success and `Ok(false)` for a
/// recoverable, reportable rejection (for example a scheduling conflict or
/// a row that is already gone). `Err` is reserved for unexpected faults;
/// the state machine converts those into a generic failure signal rather
/// than propagating them.
pub trait ReservationStore {
    /// Loads a reservation by id, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn get_reservation(&mut self, reservation_id: i64) -> Result<Option<Reservation>, StoreError>;

    /// Lists every dining table available for reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn list_tables(&mut self) -> Result<Vec<DiningTable>, StoreError>;

    /// Persists a new reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn create_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError>;

    /// Updates an existing reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn update_reservation(&mut self, reservation: &Reservation) -> Result<bool, StoreError>;

    /// Deletes a reservation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn delete_reservation(&mut self, reservation_id: i64) -> Result<bool, StoreError>;
}
