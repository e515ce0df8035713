// SyncSet integration suite.
//
// Invariants exercised:
// - Concurrent writers and readers through one shared SyncSet end in the
//   same state as a serial run.
// - Binary operations read synchronized operands under their locks while
//   other threads keep mutating unrelated sets.
// - The hooked flavor is decorated the same way as the plain one.
use probe_set::{HashValue, HookedSet, Hooks, Relocations, Set, SyncSet};
use std::collections::BTreeSet;
use std::thread;

// Test: disjoint ranges appended from several threads.
// Verifies: final length and membership; readers never observe a value
// that was not appended.
#[test]
fn concurrent_appends_and_reads() {
    let s: SyncSet<Set<u64>> = SyncSet::default();
    thread::scope(|scope| {
        for t in 0..4u64 {
            let s = &s;
            scope.spawn(move || {
                for v in (t * 1000)..(t * 1000 + 500) {
                    assert!(s.append_unique(v));
                }
            });
        }
        for _ in 0..2 {
            let s = &s;
            scope.spawn(move || {
                for v in 0..4000u64 {
                    if s.contains(&v) {
                        assert!(v % 1000 < 500);
                    }
                }
            });
        }
    });
    assert_eq!(s.len(), 2000);
    for t in 0..4u64 {
        assert!(s.contains(&(t * 1000)));
        assert!(s.contains(&(t * 1000 + 499)));
        assert!(!s.contains(&(t * 1000 + 500)));
    }
}

// Test: concurrent pops of an overlapping range.
// Verifies: every value is removed exactly once across all threads.
#[test]
fn concurrent_pops_remove_each_value_once() {
    let s: SyncSet<Set<u64>> = SyncSet::default();
    s.append_unique_all(0..1000);
    let removed: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = &s;
                scope.spawn(move || (0..1000u64).map(|v| s.pop(&v)).sum::<usize>())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });
    assert_eq!(removed, 1000);
    assert!(s.is_empty());
}

// Test: algebra between synchronized sets while writers are active elsewhere.
// Verifies: results are computed from consistent operand snapshots.
#[test]
fn algebra_on_shared_operands() {
    let a: SyncSet<Set<u64>> = SyncSet::default();
    let b: SyncSet<Set<u64>> = SyncSet::default();
    a.append_unique_all((0..300).filter(|x| x % 2 == 0));
    b.append_unique_all((0..300).filter(|x| x % 3 == 0));

    let union: SyncSet<Set<u64>> = SyncSet::default();
    let inter: SyncSet<Set<u64>> = SyncSet::default();
    let scratch: SyncSet<Set<u64>> = SyncSet::default();
    thread::scope(|scope| {
        scope.spawn(|| union.union(&a, &b));
        scope.spawn(|| inter.intersection(&a, &b));
        scope.spawn(|| {
            for v in 0..1000u64 {
                scratch.append_unique(v);
            }
        });
    });

    let expected_union: BTreeSet<u64> = (0..300).filter(|x| x % 2 == 0 || x % 3 == 0).collect();
    let expected_inter: BTreeSet<u64> = (0..300).filter(|x| x % 6 == 0).collect();
    assert_eq!(union.vals().collect::<BTreeSet<_>>(), expected_union);
    assert_eq!(inter.vals().collect::<BTreeSet<_>>(), expected_inter);
    assert!(inter.is_subset(&a));
    assert!(union.is_superset(&b));
    assert_eq!(scratch.len(), 1000);
}

#[derive(Default)]
struct Counter {
    adds: usize,
    deletes: usize,
}

impl Hooks for Counter {
    fn add_op(&mut self, _slot: HashValue) {
        self.adds += 1;
    }
    fn delete_op(&mut self, _deleted: HashValue, _relocations: &Relocations) {
        self.deletes += 1;
    }
    fn clear_op(&mut self) {}
}

// Test: hooked flavor under the lock.
// Verifies: hook counts match the effective mutations across threads; values
// below 100 end absent because each thread pops after its own append.
#[test]
fn hooked_set_under_lock() {
    let s = SyncSet::<HookedSet<u64, Counter>>::try_with_capacity(Counter::default(), 64)
        .expect("non-negative hint");
    thread::scope(|scope| {
        for _ in 0..3 {
            let s = &s;
            scope.spawn(move || {
                for v in 0..200u64 {
                    s.append_unique(v);
                }
                for v in 0..100u64 {
                    s.pop(&v);
                }
            });
        }
    });
    let inner = s.into_inner();
    assert_eq!(inner.len(), 100);
    assert_eq!(inner.hooks().adds - inner.hooks().deletes, 100);
    assert!(inner.hooks().deletes >= 100);
}
