//! Insert / move / reindex / release over the in-memory store

mod common;

use common::{append_n, positions_of, store_with_parent, CountingSet, MAX};
use ordo_core::errors::OrdoError;
use ordo_core::model::Slot;
use ordo_core::ops::ordering::{insert_record, move_record, reindex_siblings, release_record};
use ordo_core::ops::SequenceStore;
use ordo_core::rules::invariants::{check_sibling_set, is_dense};

#[test]
fn test_append_assigns_one_to_n_in_creation_order() {
    // GIVEN an empty parent
    let store = store_with_parent("q1");

    // WHEN five records are created without a position
    let ids = append_n(&store, "q1", 5);

    // THEN they hold 1..5 in creation order
    assert_eq!(positions_of(&store, "q1", &ids), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_insert_shifts_later_siblings() {
    // GIVEN siblings at [1, 2, 3]
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 3);

    // WHEN a record is inserted at 2
    let outcome = store
        .with_parent_lock("q1", |set| insert_record(set, Some(2), MAX))
        .unwrap();

    // THEN the new record is at 2 and prior 2, 3 moved to 3, 4
    assert_eq!(outcome.record.position, 2);
    assert_eq!(outcome.shifted, 2);
    assert_eq!(positions_of(&store, "q1", &ids), vec![1, 3, 4]);
}

#[test]
fn test_insert_past_end_appends_without_gap() {
    let store = store_with_parent("q1");
    append_n(&store, "q1", 2);

    let outcome = store
        .with_parent_lock("q1", |set| insert_record(set, Some(40), MAX))
        .unwrap();

    assert_eq!(outcome.record.position, 3);
    assert_eq!(outcome.shifted, 0);
    assert!(is_dense(&store.snapshot("q1").unwrap()));
}

#[test]
fn test_insert_at_ceiling_is_rejected() {
    let store = store_with_parent("q1");
    let small_max = 3;
    for _ in 0..3 {
        store
            .with_parent_lock("q1", |set| insert_record(set, None, small_max))
            .unwrap();
    }

    let err = store
        .with_parent_lock("q1", |set| insert_record(set, Some(1), small_max))
        .unwrap_err();
    assert_eq!(
        err,
        OrdoError::InvalidPosition {
            position: 4,
            max: small_max
        }
    );
    assert_eq!(store.snapshot("q1").unwrap().len(), 3);
}

#[test]
fn test_move_up_shifts_range_down_the_list() {
    // GIVEN five siblings at 1..5
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 5);

    // WHEN the record at 5 moves to 2
    let outcome = store
        .with_parent_lock("q1", |set| move_record(set, &ids[4], 2))
        .unwrap();

    // THEN 5->2, 2->3, 3->4, 4->5 and 1 stays
    assert_eq!(outcome.record.position, 2);
    assert_eq!(outcome.shifted, 3);
    assert_eq!(positions_of(&store, "q1", &ids), vec![1, 3, 4, 5, 2]);
}

#[test]
fn test_move_down_shifts_range_up_the_list() {
    // GIVEN five siblings at 1..5
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 5);

    // WHEN the record at 2 moves to 4
    store
        .with_parent_lock("q1", |set| move_record(set, &ids[1], 4))
        .unwrap();

    // THEN 3->2, 4->3, 2->4 and 1, 5 stay
    assert_eq!(positions_of(&store, "q1", &ids), vec![1, 4, 2, 3, 5]);
}

#[test]
fn test_move_first_to_last() {
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 3);

    store
        .with_parent_lock("q1", |set| move_record(set, &ids[0], 3))
        .unwrap();

    assert_eq!(positions_of(&store, "q1", &ids), vec![3, 1, 2]);
}

#[test]
fn test_move_past_end_is_clamped_to_last() {
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 3);

    let outcome = store
        .with_parent_lock("q1", |set| move_record(set, &ids[0], 99))
        .unwrap();

    assert_eq!(outcome.record.position, 3);
    assert!(is_dense(&store.snapshot("q1").unwrap()));
}

#[test]
fn test_move_to_current_position_writes_nothing() {
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 3);

    let writes = store
        .with_parent_lock("q1", |set| {
            let mut counting = CountingSet {
                inner: set,
                writes: 0,
            };
            let outcome = move_record(&mut counting, &ids[1], 2)?;
            assert_eq!(outcome.shifted, 0);
            Ok(counting.writes)
        })
        .unwrap();

    assert_eq!(writes, 0);
    assert_eq!(positions_of(&store, "q1", &ids), vec![1, 2, 3]);
}

#[test]
fn test_move_missing_record_is_not_found() {
    let store = store_with_parent("q1");
    let err = store
        .with_parent_lock("q1", |set| move_record(set, "ghost", 1))
        .unwrap_err();
    assert!(matches!(err, OrdoError::RecordNotFound { .. }));
}

#[test]
fn test_reindex_closes_gaps_in_order() {
    // GIVEN siblings at 1..5 with 2 and 4 released
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 5);
    for id in [&ids[1], &ids[3]] {
        store
            .with_parent_lock("q1", |set| release_record(set, id, false))
            .unwrap();
    }
    let survivors = vec![ids[0].clone(), ids[2].clone(), ids[4].clone()];
    assert_eq!(positions_of(&store, "q1", &survivors), vec![1, 3, 5]);

    // WHEN reindexed
    let rewritten = store
        .with_parent_lock("q1", |set| reindex_siblings(set))
        .unwrap();

    // THEN positions are 1, 2, 3 in the same order and only two rows changed
    assert_eq!(rewritten, 2);
    assert_eq!(positions_of(&store, "q1", &survivors), vec![1, 2, 3]);
}

#[test]
fn test_reindex_of_dense_set_writes_nothing() {
    let store = store_with_parent("q1");
    append_n(&store, "q1", 4);

    let writes = store
        .with_parent_lock("q1", |set| {
            let mut counting = CountingSet {
                inner: set,
                writes: 0,
            };
            reindex_siblings(&mut counting)?;
            Ok(counting.writes)
        })
        .unwrap();

    assert_eq!(writes, 0);
}

#[test]
fn test_release_with_compaction_leaves_dense_set() {
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 4);

    store
        .with_parent_lock("q1", |set| release_record(set, &ids[0], true))
        .unwrap();

    let rest = vec![ids[1].clone(), ids[2].clone(), ids[3].clone()];
    assert_eq!(positions_of(&store, "q1", &rest), vec![1, 2, 3]);
}

#[test]
fn test_release_missing_record_is_not_found() {
    let store = store_with_parent("q1");
    let err = store
        .with_parent_lock("q1", |set| release_record(set, "ghost", false))
        .unwrap_err();
    assert!(matches!(err, OrdoError::RecordNotFound { .. }));
}

#[test]
fn test_parents_are_independent() {
    let store = store_with_parent("q1");
    store.register_parent("q2").unwrap();

    let a = append_n(&store, "q1", 2);
    let b = append_n(&store, "q2", 2);
    store
        .with_parent_lock("q1", |set| move_record(set, &a[1], 1))
        .unwrap();

    assert_eq!(positions_of(&store, "q1", &a), vec![2, 1]);
    assert_eq!(positions_of(&store, "q2", &b), vec![1, 2]);
}

#[test]
fn test_mixed_sequence_keeps_invariants() {
    let store = store_with_parent("q1");
    let ids = append_n(&store, "q1", 6);

    store
        .with_parent_lock("q1", |set| {
            insert_record(set, Some(3), MAX)?;
            move_record(set, &ids[0], 6)?;
            release_record(set, &ids[3], false)?;
            move_record(set, &ids[5], 1)?;
            Ok(())
        })
        .unwrap();

    let slots: Vec<Slot> = store.snapshot("q1").unwrap();
    assert_eq!(slots.len(), 6);
    check_sibling_set("q1", &slots, MAX).unwrap();
}
