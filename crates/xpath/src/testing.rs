//! Convention checks shared by the unit and integration tests of axes and
//! filters.

use crate::axis::Axis;
use crate::error::AxisError;
use crate::filter::Filter;
use strata_cursor::NodeCursor;
use strata_types::NodeKey;

/// Runs `axis` from the cursor's current node and checks the axis contract
/// along the way:
///
/// - `has_next` is idempotent and `next` leaves the cursor on the key it
///   returns.
/// - The keys equal `expected`, in order.
/// - Once exhausted the axis stays exhausted, `next` fails with
///   `ExhaustedAxis`, and the cursor is back on the start node.
/// - A second run after `reset` yields the same keys.
pub fn assert_axis_conventions<C: NodeCursor, A: Axis<C> + ?Sized>(
    axis: &mut A,
    cursor: &mut C,
    expected: &[u64],
) {
    let start = cursor.node_key();
    for run in 0..2 {
        axis.reset(start);
        let mut actual = Vec::new();
        loop {
            let first = axis.has_next(cursor).expect("has_next failed");
            let second = axis.has_next(cursor).expect("has_next failed");
            assert_eq!(first, second, "has_next is not idempotent");
            if !first {
                break;
            }
            let key = axis.next(cursor).expect("next failed");
            assert_eq!(cursor.node_key(), key, "cursor is not on the returned key");
            actual.push(key.get());
        }
        assert_eq!(actual, expected, "run {} yielded unexpected keys", run);
        assert_eq!(cursor.node_key(), start, "cursor not restored to start");
        assert!(!axis.has_next(cursor).expect("has_next failed"));
        assert_eq!(axis.next(cursor), Err(AxisError::ExhaustedAxis));
    }
}

/// Moves to `key` and checks that `filter` returns `expected` repeatedly
/// without moving the cursor.
pub fn assert_filter_conventions<C: NodeCursor, F: Filter<C> + ?Sized>(
    filter: &mut F,
    cursor: &mut C,
    key: NodeKey,
    expected: bool,
) {
    assert!(cursor.move_to(key), "test key {} does not resolve", key);
    for _ in 0..2 {
        assert_eq!(filter.filter(cursor).expect("filter failed"), expected);
        assert_eq!(cursor.node_key(), key, "filter moved the cursor");
    }
}
