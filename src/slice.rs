// Copyright 2025 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Column-range boundary algebra (§4.1).
//!
//! The backend's slice primitive is inclusive on both endpoints and has no
//! exclusivity flags. There is no general successor function over byte
//! sequences, so exclusivity cannot be emulated by nudging an endpoint; it
//! has to be emulated by filtering the backend's (inclusive) answer on the
//! client side. This module isolates that pure, RPC-free decision so it can
//! be tested without a backend double.
use bytes::Bytes;

use crate::error::{Result, StoreError};
use crate::rpc::Entry;

/// What to do to satisfy a `getSlice` call, decided purely from the
/// arguments (§4.1's "Boundary algebra").
pub enum SlicePlan {
    /// The interval is provably empty; do not contact the backend.
    Empty,
    /// Degenerate single-column case (`colStart == colEnd`, both inclusive):
    /// equivalent to a point read.
    PointRead { column: Bytes },
    /// Issue a backend range slice with both endpoints inclusive, then
    /// filter client-side per `start_inclusive`/`end_inclusive`.
    RemoteRange {
        start: Bytes,
        finish: Bytes,
        count: i32,
    },
}

/// Coerces a negative limit to 0 (with a warning left to the caller, since
/// this function is pure) and caps it to `i32::MAX`, the backend's `count`
/// field width.
pub fn normalize_limit(limit: i64) -> i32 {
    if limit < 0 {
        0
    } else {
        limit.min(i32::MAX as i64) as i32
    }
}

/// Decide how to satisfy `getSlice(col_start, col_end, start_inclusive,
/// end_inclusive, limit)`. `limit` must already be normalized by
/// [`normalize_limit`].
pub fn plan_slice(
    col_start: &Bytes,
    col_end: &Bytes,
    start_inclusive: bool,
    end_inclusive: bool,
    limit: i32,
) -> Result<SlicePlan> {
    if col_start > col_end {
        return Err(StoreError::Argument(format!(
            "colStart ({col_start:?}) > colEnd ({col_end:?})"
        )));
    }
    if limit == 0 {
        return Ok(SlicePlan::Empty);
    }
    if col_start == col_end {
        return if start_inclusive && end_inclusive {
            Ok(SlicePlan::PointRead {
                column: col_start.clone(),
            })
        } else {
            // A single point that excludes itself on either side: the
            // interval is empty by construction, not merely likely empty.
            Ok(SlicePlan::Empty)
        };
    }
    Ok(SlicePlan::RemoteRange {
        start: col_start.clone(),
        finish: col_end.clone(),
        count: limit,
    })
}

/// Filter the backend's inclusive-inclusive answer down to the half-open
/// interval the caller actually asked for. The backend is assumed to
/// preserve ascending column order; this only drops boundary entries, it
/// never reorders.
pub fn filter_inclusive_result(
    entries: Vec<Entry>,
    col_start: &Bytes,
    col_end: &Bytes,
    start_inclusive: bool,
    end_inclusive: bool,
) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| {
            if !start_inclusive && &entry.column <= col_start {
                return false;
            }
            if !end_inclusive && &entry.column >= col_end {
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &[u8]) -> Bytes {
        Bytes::copy_from_slice(s)
    }

    #[test]
    fn start_greater_than_end_is_an_argument_error() {
        let err = plan_slice(&b(&[0x05]), &b(&[0x02]), true, true, 10).unwrap_err();
        assert!(matches!(err, StoreError::Argument(_)));
    }

    #[test]
    fn zero_limit_is_empty_without_a_call() {
        assert!(matches!(
            plan_slice(&b(&[0x01]), &b(&[0x02]), true, true, 0).unwrap(),
            SlicePlan::Empty
        ));
    }

    #[test]
    fn equal_endpoints_both_inclusive_is_a_point_read() {
        let plan = plan_slice(&b(&[0x01]), &b(&[0x01]), true, true, 10).unwrap();
        assert!(matches!(plan, SlicePlan::PointRead { column } if column == b(&[0x01])));
    }

    #[test]
    fn equal_endpoints_mixed_inclusivity_is_empty() {
        assert!(matches!(
            plan_slice(&b(&[0x01]), &b(&[0x01]), true, false, 10).unwrap(),
            SlicePlan::Empty
        ));
        assert!(matches!(
            plan_slice(&b(&[0x01]), &b(&[0x01]), false, true, 10).unwrap(),
            SlicePlan::Empty
        ));
        assert!(matches!(
            plan_slice(&b(&[0x01]), &b(&[0x01]), false, false, 10).unwrap(),
            SlicePlan::Empty
        ));
    }

    #[test]
    fn filters_both_boundaries_when_exclusive() {
        let entries = vec![
            Entry::new(&[0x01][..], &b"A"[..]),
            Entry::new(&[0x02][..], &b"B"[..]),
            Entry::new(&[0x03][..], &b"C"[..]),
        ];
        let filtered =
            filter_inclusive_result(entries, &b(&[0x01]), &b(&[0x03]), false, false);
        assert_eq!(filtered, vec![Entry::new(&[0x02][..], &b"B"[..])]);
    }

    #[test]
    fn normalize_limit_coerces_negative_to_zero() {
        assert_eq!(normalize_limit(-1), 0);
        assert_eq!(normalize_limit(0), 0);
        assert_eq!(normalize_limit(5), 5);
    }
}
