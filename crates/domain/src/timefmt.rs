// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared wire and storage formats for dates and times.
//!
//! Instants are exchanged and persisted as zero-padded strings so that
//! lexicographic comparison matches chronological order.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Calendar date format (`2026-08-07`).
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Time-of-day format (`18:30`).
pub const TIME_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

/// Lenient time-of-day parse format; seconds may be omitted.
pub const TIME_PARSE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!(version = 2, "[hour]:[minute][optional [:[second]]]");

/// Combined instant format used for persistence (`2026-08-07 18:30:00`).
pub const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
