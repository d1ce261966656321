//! Copies handshake attributes into frame requests.
//!
//! The handshake attribute map may be written to by other tasks while frames
//! are translated. Rather than locking it, the common case merges the live map
//! directly and only pays for a private snapshot when something looks off:
//! - the recorded size hint no longer matches the live count, or
//! - the live merge itself reports a concurrent modification.
//!
//! A stale hint that happens to match the live count still takes the fast
//! path; the result is then best effort, not a strict point-in-time copy.

use tracing::trace;

use crate::protocol::{
    ATTRIBUTE_COUNT_HINT, AttributeSource, Attributes, SIMPLE_HTTP_OVER_WEBSOCKET, SUBPROTOCOL_ATTRIBUTE,
};

/// Builds the attribute map of a new frame request from `source`.
///
/// Never fails: every detected race degrades to a private snapshot.
pub(crate) fn propagate_attributes(source: &dyn AttributeSource) -> Attributes {
    let mut attributes = seeded(source);

    if hint_mismatch(source) {
        trace!("attribute size hint is stale, copying a snapshot");
        attributes.extend(source.snapshot());
        return attributes;
    }

    if let Err(e) = source.merge_into(&mut attributes) {
        trace!(cause = %e, "attributes changed while merging, copying a snapshot");
        attributes = seeded(source);
        attributes.extend(source.snapshot());
    }

    attributes
}

fn seeded(source: &dyn AttributeSource) -> Attributes {
    let mut attributes = Attributes::with_capacity(source.len() + 1);
    attributes.insert(SUBPROTOCOL_ATTRIBUTE, SIMPLE_HTTP_OVER_WEBSOCKET);
    attributes
}

fn hint_mismatch(source: &dyn AttributeSource) -> bool {
    let Some(hint) = source.get(ATTRIBUTE_COUNT_HINT).and_then(|value| value.as_int()) else {
        return false;
    };
    usize::try_from(hint).map_or(true, |hint| hint != source.len())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use mockall::predicate::eq;

    use super::*;
    use crate::protocol::{AttributeValue, ConcurrentModification, MockAttributeSource, SharedAttributes};

    fn live_entries() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("user", "alice");
        attributes.insert("visits", 7_i64);
        attributes
    }

    #[test]
    fn no_hint_merges_live_map() {
        let shared = SharedAttributes::from(live_entries());

        let attributes = propagate_attributes(&shared);

        assert_eq!(attributes.len(), 3);
        assert_eq!(
            attributes.get(SUBPROTOCOL_ATTRIBUTE).and_then(AttributeValue::as_str),
            Some(SIMPLE_HTTP_OVER_WEBSOCKET)
        );
        assert_eq!(attributes.get("user").and_then(AttributeValue::as_str), Some("alice"));
        assert_eq!(attributes.get("visits").and_then(AttributeValue::as_int), Some(7));
    }

    #[test]
    fn matching_hint_takes_live_path() {
        let mut source = MockAttributeSource::new();
        source.expect_get().with(eq(ATTRIBUTE_COUNT_HINT)).return_const(Some(AttributeValue::Int(3)));
        source.expect_len().return_const(3_usize);
        source.expect_merge_into().times(1).returning(|target| {
            target.extend(live_entries());
            target.insert(ATTRIBUTE_COUNT_HINT, 3_i64);
            Ok(())
        });
        source.expect_snapshot().never();

        let attributes = propagate_attributes(&source);

        assert_eq!(attributes.len(), 4);
        assert!(attributes.contains(SUBPROTOCOL_ATTRIBUTE));
        assert!(attributes.contains("user"));
        assert!(attributes.contains("visits"));
        assert!(attributes.contains(ATTRIBUTE_COUNT_HINT));
    }

    #[test]
    fn mismatched_hint_takes_snapshot() {
        let mut source = MockAttributeSource::new();
        source.expect_get().with(eq(ATTRIBUTE_COUNT_HINT)).return_const(Some(AttributeValue::Int(1)));
        source.expect_len().return_const(2_usize);
        source.expect_merge_into().never();
        source.expect_snapshot().times(1).returning(live_entries);

        let attributes = propagate_attributes(&source);

        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes.get("user").and_then(AttributeValue::as_str), Some("alice"));
    }

    #[test]
    fn negative_hint_counts_as_mismatch() {
        let mut source = MockAttributeSource::new();
        source.expect_get().return_const(Some(AttributeValue::Int(-1)));
        source.expect_len().return_const(0_usize);
        source.expect_merge_into().never();
        source.expect_snapshot().times(1).returning(Attributes::new);

        let attributes = propagate_attributes(&source);

        assert_eq!(attributes.len(), 1);
    }

    #[test]
    fn concurrent_modification_falls_back_to_snapshot() {
        let mut source = MockAttributeSource::new();
        source.expect_get().return_const(None::<AttributeValue>);
        source.expect_len().return_const(2_usize);
        source.expect_merge_into().times(1).returning(|target| {
            // partial merge of an entry that is gone by the time of the snapshot
            target.insert("removed", "stale");
            Err(ConcurrentModification::new(4, 5))
        });
        source.expect_snapshot().times(1).returning(live_entries);

        let attributes = propagate_attributes(&source);

        assert_eq!(attributes.len(), 3);
        assert!(attributes.contains(SUBPROTOCOL_ATTRIBUTE));
        assert!(!attributes.contains("removed"));
        assert_eq!(attributes.get("user").and_then(AttributeValue::as_str), Some("alice"));
    }

    #[test]
    fn handshake_entry_overrides_marker() {
        let shared = SharedAttributes::new();
        shared.insert(SUBPROTOCOL_ATTRIBUTE, "custom");

        let attributes = propagate_attributes(&shared);

        assert_eq!(attributes.get(SUBPROTOCOL_ATTRIBUTE).and_then(AttributeValue::as_str), Some("custom"));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_writes() {
        let shared = SharedAttributes::from(live_entries());
        shared.insert(ATTRIBUTE_COUNT_HINT, 10_i64);

        let attributes = propagate_attributes(&shared);
        shared.insert("late", "value");
        shared.remove("user");

        assert!(!attributes.contains("late"));
        assert_eq!(attributes.get("user").and_then(AttributeValue::as_str), Some("alice"));
    }

    #[test]
    fn concurrent_writers_never_fault() {
        let shared = Arc::new(SharedAttributes::from(live_entries()));
        shared.record_len_hint();

        thread::scope(|scope| {
            let writer = Arc::clone(&shared);
            scope.spawn(move || {
                for i in 0..500_i64 {
                    writer.insert(format!("key-{}", i % 16), i);
                }
            });

            for _ in 0..500 {
                let attributes = propagate_attributes(shared.as_ref());
                assert!(attributes.contains(SUBPROTOCOL_ATTRIBUTE));
                assert!(attributes.contains("user"));
            }
        });
    }
}
