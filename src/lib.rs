//! probe-set: an open-addressed unique-value set over an unbounded probe
//! space, parameterized by a stateless `Widget`, with set algebra, change
//! hooks and an opt-in reader-writer lock.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the load-bearing probe/repair algorithm in one small layer
//!   and build every other flavor around it by composition.
//! - Layers:
//!   - `HashValue`: a `u64` that is both a hash and a slot position, with
//!     ordered and order-independent folds.
//!   - `Widget<T>`: equality, order, hash and reset as associated
//!     functions, bound as a type parameter. `DefaultWidget<S>` delegates
//!     to `Eq`/`Ord`/`Hash`/`Default` through a `BuildHasher`.
//!   - `Set<T, W>`: the engine. A sparse index (position -> storage key)
//!     over a `SlotMap` of values. Insert, lookup and delete-with-repair.
//!   - `SetLookup`/`SetRead`/`SetSlots`/`SetWrite`/`ReadLock`: capability
//!     traits; set algebra is written once against them. Operands only
//!     need `SetLookup` (membership) or `SetRead` (iteration), so foreign
//!     containers can take part.
//!   - `HookedSet<T, H, W>`: wraps `Set` and notifies `H: Hooks` of adds,
//!     deletes (with the relocation map) and clears.
//!   - `SyncSet<S>`: wraps either flavor in a `std::sync::RwLock`.
//!
//! Probe space
//! - Positions span the full `u64` domain and wrap at the top, so there is
//!   no bucket count, load factor or rehash. A value with home `h` lives
//!   at the first position of `h, h+1, ...` that was free when it was
//!   inserted and not taken by an equal value.
//! - Each stored value keeps its home hash; `Widget::hash` runs once per
//!   insertion, lookups compare cached hashes before calling `Widget::eq`.
//!
//! Deletion
//! - Removing the value at `p` opens a hole. The walk continues through
//!   the occupied run after `p`; a value at `q` whose probe path from its
//!   home to `q` passes over the hole moves into it, and `q` becomes the
//!   new hole. Values homed after the hole stay. The walk ends at the
//!   first free position. Every survivor stays reachable from its home.
//!
//! Failure model
//! - Construction with a negative capacity hint is the only error
//!   (`SetError`). "Already present" and "not present" are ordinary
//!   return values.
//! - `SetWidget::lt` panics: sets have no total order.
//! - Hooks run after the set is consistent (before emptying, for clear),
//!   so a panicking hook cannot corrupt it. Clearing an empty set fires
//!   nothing.
//!
//! Concurrency
//! - `Set` and `HookedSet` take no locks; their `ReadLock` impl is a plain
//!   borrow. `SyncSet` holds the write lock for a whole mutation and the
//!   read lock for reads. Binary operations lock the receiver, then the
//!   left operand, then the right one.
//! - Hooks run under the caller's write lock; re-entering the same
//!   `SyncSet` from a hook deadlocks.

mod algebra;
mod hash;
mod hooked;
mod set;
#[cfg(test)]
mod set_proptest;
mod sync;
mod widget;

pub use algebra::{ReadLock, SetLookup, SetRead, SetSlots, SetWidget, SetWrite};
pub use hash::HashValue;
pub use hooked::{HookedSet, Hooks, NoHooks, Relocations};
pub use set::{Iter, Set, SetError, Slots};
pub use sync::{SyncSet, Vals};
pub use widget::{DefaultWidget, Widget};
