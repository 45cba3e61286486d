// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for login session storage.

use crate::{SessionRecord, SqliteStore};
use time::Duration;

use super::{NOW, seeded_store};

#[test]
fn test_create_and_fetch_session() {
    let mut store: SqliteStore = seeded_store();

    let session_id: i64 = store
        .create_session("token-1", 1, NOW, NOW + Duration::days(14))
        .unwrap();

    let record: SessionRecord = store.get_session("token-1").unwrap().unwrap();
    assert_eq!(record.session_id, session_id);
    assert_eq!(record.user_id, 1);
    assert_eq!(record.created_at, "2026-08-06 12:00:00");
    assert_eq!(record.expires_at, "2026-08-20 12:00:00");
    assert_eq!(record.last_seen_at, record.created_at);
}

#[test]
fn test_unknown_token_returns_none() {
    let mut store: SqliteStore = seeded_store();

    assert!(store.get_session("nope").unwrap().is_none());
}

#[test]
fn test_touch_updates_last_seen() {
    let mut store: SqliteStore = seeded_store();
    let session_id: i64 = store
        .create_session("token-1", 1, NOW, NOW + Duration::days(14))
        .unwrap();

    store
        .touch_session(session_id, NOW + Duration::hours(1))
        .unwrap();

    let record: SessionRecord = store.get_session("token-1").unwrap().unwrap();
    assert_eq!(record.last_seen_at, "2026-08-06 13:00:00");
}

#[test]
fn test_delete_session() {
    let mut store: SqliteStore = seeded_store();
    store
        .create_session("token-1", 1, NOW, NOW + Duration::days(14))
        .unwrap();

    assert!(store.delete_session("token-1").unwrap());
    assert!(!store.delete_session("token-1").unwrap());
    assert!(store.get_session("token-1").unwrap().is_none());
}

#[test]
fn test_purge_removes_only_expired_sessions() {
    let mut store: SqliteStore = seeded_store();
    store
        .create_session("stale", 1, NOW - Duration::days(30), NOW - Duration::days(16))
        .unwrap();
    store
        .create_session("fresh", 2, NOW, NOW + Duration::days(14))
        .unwrap();

    let purged: usize = store.purge_expired_sessions(NOW).unwrap();

    assert_eq!(purged, 1);
    assert!(store.get_session("stale").unwrap().is_none());
    assert!(store.get_session("fresh").unwrap().is_some());
}
