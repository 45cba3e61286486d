// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::ReservationDraft;
use time::PrimitiveDateTime;

/// Validates a reservation draft before it is submitted for persistence.
///
/// This function is pure, deterministic, and has no side effects. Checks
/// run in a fixed order and the first failure wins:
///
/// 1. A table must be selected, independent of the time fields.
/// 2. The end instant must be strictly after the start instant.
/// 3. New drafts must not start before `now`; existing reservations may
///    keep a past start so history can still be edited.
///
/// Validation is advisory: the persistence layer's own rejection (for
/// example an overlapping booking) remains authoritative and is reported
/// separately by the caller.
///
/// # Arguments
///
/// * `draft` - The candidate reservation
/// * `is_existing` - Whether the draft edits an already-persisted record
/// * `now` - The current instant
///
/// # Returns
///
/// * `Ok(())` if the draft is structurally and temporally valid
/// * `Err(DomainError)` naming the first failed rule
///
/// # Errors
///
/// Returns an error if:
/// - No table is selected (`TableRequired`)
/// - The end instant is at or before the start instant (`EndNotAfterStart`)
/// - A new draft starts in the past (`StartInPast`)
pub fn validate_draft(
    draft: &ReservationDraft,
    is_existing: bool,
    now: PrimitiveDateTime,
) -> Result<(), DomainError> {
    // Rule: a table must be selected
    if draft.table_id.is_none() {
        return Err(DomainError::TableRequired);
    }

    let start: PrimitiveDateTime = draft.start_instant();
    let end: PrimitiveDateTime = draft.end_instant();

    // Rule: the reservation must cover a positive span
    if end <= start {
        return Err(DomainError::EndNotAfterStart { start, end });
    }

    // Rule: only new reservations are barred from starting in the past
    if !is_existing && start < now {
        return Err(DomainError::StartInPast { start });
    }

    Ok(())
}
