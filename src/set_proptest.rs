#![cfg(test)]

// Property tests for the Set engine kept inside the crate so they can use
// the positional invariant checker.

use crate::hash::HashValue;
use crate::hooked::{HookedSet, Hooks, Relocations};
use crate::set::tests::ModWidget;
use crate::set::Set;
use crate::widget::Widget;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

// Pool-indexed operations so shrinking moves toward earlier values.
#[derive(Clone, Debug)]
enum Op {
    Append(usize),
    Pop(usize),
    Contains(u64),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<Op>)> {
    proptest::collection::vec(0u64..64, 1..=16).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Append),
            3 => idx.clone().prop_map(Op::Pop),
            2 => (0u64..64).prop_map(Op::Contains),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<W: Widget<u64>>(pool: &[u64], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: Set<u64, W> = Set::new();
    let mut model: HashSet<u64> = HashSet::new();

    for op in ops {
        match op {
            Op::Append(i) => {
                let v = pool[i];
                let fresh = !model.contains(&v);
                prop_assert_eq!(sut.append_unique(v), fresh);
                model.insert(v);
            }
            Op::Pop(i) => {
                let v = pool[i];
                let expected = usize::from(model.remove(&v));
                prop_assert_eq!(sut.pop(&v), expected);
                prop_assert!(!sut.contains(&v));
            }
            Op::Contains(v) => {
                prop_assert_eq!(sut.contains(&v), model.contains(&v));
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let seen: BTreeSet<u64> = sut.iter().copied().collect();
                let expected: BTreeSet<u64> = model.iter().copied().collect();
                prop_assert_eq!(seen, expected);
            }
        }

        // Post-conditions after each op
        if let Err(e) = sut.check_invariants() {
            prop_assert!(false, "{}", e);
        }
        prop_assert_eq!(sut.len(), model.len());
        for v in &model {
            prop_assert!(sut.contains(v), "survivor {} unreachable", v);
        }
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashSet,
// with the default widget and with heavy forced collisions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine::<crate::widget::DefaultWidget>(&pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine::<ModWidget<3>>(&pool, ops)?;
    }
}

fn arb_deletion_order() -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::btree_set(0u64..200, 1..60)
        .prop_map(|s| s.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

// Property: with hash(v) = v mod k, deleting every element in random order
// keeps every survivor reachable after each single deletion.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_deletion_preserves_reachability(order in arb_deletion_order(), insert_rev in any::<bool>()) {
        let mut sut: Set<u64, ModWidget<5>> = Set::new();
        let mut live: BTreeSet<u64> = order.iter().copied().collect();
        if insert_rev {
            sut.append_unique_all(live.iter().rev().copied());
        } else {
            sut.append_unique_all(live.iter().copied());
        }

        for v in order {
            prop_assert_eq!(sut.pop(&v), 1);
            live.remove(&v);
            for w in &live {
                prop_assert!(sut.contains(w), "{} lost after deleting {}", w, v);
            }
            if let Err(e) = sut.check_invariants() {
                prop_assert!(false, "{}", e);
            }
        }
        prop_assert!(sut.is_empty());
    }
}

// Secondary index of occupied positions maintained only from hook events.
#[derive(Default)]
struct PositionMirror {
    occupied: BTreeSet<u64>,
    last_relocations: Vec<(u64, u64)>,
}

impl Hooks for PositionMirror {
    fn add_op(&mut self, slot: HashValue) {
        self.occupied.insert(slot.get());
    }
    fn delete_op(&mut self, deleted: HashValue, relocations: &Relocations) {
        self.occupied.remove(&deleted.get());
        for old in relocations.keys() {
            self.occupied.remove(&old.get());
        }
        for new in relocations.values() {
            self.occupied.insert(new.get());
        }
        self.last_relocations = relocations.iter().map(|(o, n)| (o.get(), n.get())).collect();
    }
    fn clear_op(&mut self) {
        self.occupied.clear();
    }
}

// Property: a structure fed only hook events tracks the set's occupied
// positions exactly, and each relocation map lists only slots that moved.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_hooks_mirror_positions((pool, ops) in arb_scenario()) {
        let mut sut: HookedSet<u64, PositionMirror, ModWidget<4>> = HookedSet::default();
        for op in ops {
            match op {
                Op::Append(i) => { sut.append_unique(pool[i]); }
                Op::Pop(i) => {
                    let v = pool[i];
                    let before: Vec<(u64, u64)> = sut
                        .slots()
                        .map(|(p, w)| (p.get(), *w))
                        .collect();
                    sut.hooks_mut().last_relocations.clear();
                    if sut.pop(&v) == 1 {
                        for &(old, new) in &sut.hooks().last_relocations {
                            prop_assert_ne!(old, new);
                            let moved = before.iter().find(|(p, _)| *p == old).map(|(_, w)| *w);
                            prop_assert!(moved.is_some(), "relocated slot {} was not occupied", old);
                            prop_assert_eq!(sut.get_at(HashValue::new(new)).copied(), moved);
                        }
                        // Slots not in the map kept their values.
                        for (p, w) in before {
                            if w == v || sut.hooks().last_relocations.iter().any(|(o, _)| *o == p) {
                                continue;
                            }
                            prop_assert_eq!(sut.position_of(&w), Some(HashValue::new(p)));
                        }
                    }
                }
                Op::Contains(_) | Op::Iterate => {}
                Op::Clear => sut.clear(),
            }
            let actual: BTreeSet<u64> = sut.slots().map(|(p, _)| p.get()).collect();
            prop_assert_eq!(&sut.hooks().occupied, &actual);
        }
    }
}
