// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tablebook_domain::Identity;

/// The derived authorization state for one reservation.
///
/// Snapshots are cheap to compute and recomputed eagerly whenever the
/// identity or the reservation's owner changes; they are never stored
/// durably or trusted across such a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSnapshot {
    /// The identity carries staff-level authority (Staff or Admin).
    pub is_privileged: bool,
    /// The identity owns this reservation.
    pub is_owner: bool,
    /// The identity may mutate this reservation.
    pub can_manage: bool,
}

impl PermissionSnapshot {
    /// The fail-closed snapshot: nothing is permitted.
    ///
    /// Used as the default while a load is in flight and whenever no
    /// identity is present.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            is_privileged: false,
            is_owner: false,
            can_manage: false,
        }
    }
}

impl Default for PermissionSnapshot {
    fn default() -> Self {
        Self::none()
    }
}

/// Evaluates role- and ownership-based authorization for a reservation.
///
/// Pure and side-effect free. Must be re-invoked whenever the identity or
/// the owner changes; the result is never assumed stable.
///
/// # Arguments
///
/// * `identity` - The current authenticated identity, if any
/// * `owner_user_id` - The reservation owner's account id (values `<= 0`
///   mean the owner is not yet known)
///
/// # Returns
///
/// The derived snapshot. Without an identity, `can_manage` is false
/// unconditionally, regardless of `owner_user_id`.
#[must_use]
pub const fn evaluate(identity: Option<&Identity>, owner_user_id: i64) -> PermissionSnapshot {
    match identity {
        None => PermissionSnapshot::none(),
        Some(identity) => {
            let is_privileged: bool = identity.role.is_privileged();
            let is_owner: bool = owner_user_id > 0 && identity.id == owner_user_id;
            PermissionSnapshot {
                is_privileged,
                is_owner,
                can_manage: is_privileged || is_owner,
            }
        }
    }
}
