//! SyncSet: reader-writer lock decorator for any set flavor.
//!
//! Every mutation holds the write lock for its whole duration, chain repair
//! and hook callbacks included. Reads, including reads of the operands of a
//! binary operation, hold the read lock. Hooks run under the caller's write
//! lock and must not call back into the same `SyncSet`, or they deadlock.
//!
//! Poisoning is ignored: mutations finish their structural work before any
//! user hook runs, so a poisoned lock still guards a consistent set.

use crate::algebra::{ReadLock, SetLookup, SetRead, SetSlots, SetWrite};
use crate::hash::HashValue;
use crate::hooked::HookedSet;
use crate::set::{Set, SetError};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::vec;

pub struct SyncSet<S> {
    inner: RwLock<S>,
}

impl<S> SyncSet<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    pub fn into_inner(self) -> S {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access without locking; the borrow proves there are no
    /// other users.
    pub fn get_mut(&mut self) -> &mut S {
        self.inner.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hold the write lock across several operations.
    pub fn write(&self) -> RwLockWriteGuard<'_, S> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, S> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, W> SyncSet<Set<T, W>> {
    pub fn try_with_capacity(hint: isize) -> Result<Self, SetError> {
        Set::try_with_capacity(hint).map(Self::new)
    }
}

impl<T, H, W> SyncSet<HookedSet<T, H, W>> {
    pub fn try_with_capacity(hooks: H, hint: isize) -> Result<Self, SetError> {
        HookedSet::try_with_capacity(hooks, hint).map(Self::new)
    }
}

impl<S: Default> Default for SyncSet<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> From<S> for SyncSet<S> {
    fn from(inner: S) -> Self {
        Self::new(inner)
    }
}

impl<S> ReadLock for SyncSet<S> {
    type Target = S;
    type Guard<'a>
        = RwLockReadGuard<'a, S>
    where
        Self: 'a;

    fn read(&self) -> Self::Guard<'_> {
        self.read_guard()
    }
}

impl<S> SyncSet<S>
where
    S: SetLookup,
{
    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_guard().is_empty()
    }

    pub fn contains(&self, value: &S::Item) -> bool {
        self.read_guard().contains(value)
    }
}

impl<S> SyncSet<S>
where
    S: SetSlots,
{
    pub fn position_of(&self, value: &S::Item) -> Option<HashValue> {
        self.read_guard().position_of(value)
    }

    pub fn set_hash(&self) -> HashValue {
        self.read_guard().set_hash()
    }

    /// Lazy sequence of the values. The read lock is taken when the first
    /// value is pulled and released once the sequence is exhausted or
    /// dropped; call again to restart.
    pub fn vals(&self) -> Vals<'_, S>
    where
        S::Item: Clone,
    {
        Vals {
            lock: &self.inner,
            state: ValsState::Idle,
        }
    }
}

/// The comparisons answer `true` without locking when `other` is this very
/// `SyncSet`: taking the read lock twice on one thread can deadlock behind a
/// queued writer.
impl<S> SyncSet<S>
where
    S: SetRead,
{
    fn is_self<O: ?Sized>(&self, other: &O) -> bool {
        core::ptr::eq(self as *const Self as *const u8, other as *const O as *const u8)
            && core::mem::size_of_val(other) == core::mem::size_of::<Self>()
    }

    pub fn unordered_eq<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetLookup<Item = S::Item>,
    {
        self.is_self(other) || self.read_guard().unordered_eq(other)
    }

    pub fn is_subset<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetLookup<Item = S::Item>,
    {
        self.is_self(other) || self.read_guard().is_subset(other)
    }

    pub fn is_superset<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetRead<Item = S::Item>,
    {
        self.is_self(other) || self.read_guard().is_superset(other)
    }
}

impl<S> SyncSet<S>
where
    S: SetWrite,
{
    pub fn append_unique(&self, value: S::Item) -> bool {
        self.write().append_unique(value)
    }

    /// Insert every value under a single write lock; returns how many were new.
    pub fn append_unique_all<I>(&self, values: I) -> usize
    where
        I: IntoIterator<Item = S::Item>,
    {
        let mut guard = self.write();
        values
            .into_iter()
            .map(|v| guard.append_unique(v))
            .filter(|&inserted| inserted)
            .count()
    }

    pub fn pop(&self, value: &S::Item) -> usize {
        self.write().pop(value)
    }

    pub fn clear(&self) {
        self.write().clear()
    }

    pub fn intersection<L, R>(&self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = S::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetLookup<Item = S::Item>,
        S::Item: Clone,
    {
        self.write().intersection(l, r)
    }

    pub fn union<L, R>(&self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = S::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetRead<Item = S::Item>,
        S::Item: Clone,
    {
        self.write().union(l, r)
    }

    pub fn difference<L, R>(&self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = S::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetLookup<Item = S::Item>,
        S::Item: Clone,
    {
        self.write().difference(l, r)
    }
}

/// Lazy, lock-holding value sequence returned by [`SyncSet::vals`].
pub struct Vals<'a, S> {
    lock: &'a RwLock<S>,
    state: ValsState<'a, S>,
}

enum ValsState<'a, S> {
    Idle,
    Reading(Cursor<'a, S>),
    Done,
}

struct Cursor<'a, S> {
    guard: RwLockReadGuard<'a, S>,
    positions: vec::IntoIter<HashValue>,
}

impl<'a, S> Cursor<'a, S>
where
    S: SetSlots,
    S::Item: Clone,
{
    fn acquire(lock: &'a RwLock<S>) -> Self {
        let guard = lock.read().unwrap_or_else(PoisonError::into_inner);
        // Positions are stable for as long as the guard is held.
        let positions: Vec<HashValue> = guard.slots().map(|(p, _)| p).collect();
        Cursor {
            guard,
            positions: positions.into_iter(),
        }
    }

    fn next(&mut self) -> Option<S::Item> {
        let position = self.positions.next()?;
        self.guard.get_at(position).cloned()
    }
}

impl<'a, S> Vals<'a, S> {
    /// Whether the read lock is currently held by this sequence.
    pub fn is_reading(&self) -> bool {
        matches!(self.state, ValsState::Reading(_))
    }
}

impl<'a, S> Iterator for Vals<'a, S>
where
    S: SetSlots,
    S::Item: Clone,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if let ValsState::Idle = self.state {
            self.state = ValsState::Reading(Cursor::acquire(self.lock));
        }
        let next = match &mut self.state {
            ValsState::Reading(cursor) => cursor.next(),
            _ => return None,
        };
        if next.is_none() {
            // Drops the guard.
            self.state = ValsState::Done;
        }
        next
    }
}
