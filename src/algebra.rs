//! Capability traits shared by every set flavor, and the set algebra built
//! on top of them.
//!
//! The "other" side of a binary operation only needs what the operation
//! actually uses: `SetLookup` (length and membership) for operands that are
//! only queried, `SetRead` (plus iteration) for operands that are scanned.
//! `SetSlots` adds the positional view specific to this crate's sets, and
//! `SetWrite` is the receiver that gets rebuilt. Operands are always taken
//! through [`ReadLock`], so the same algebra works whether an operand is a
//! plain set (the lock is a no-op borrow) or a [`SyncSet`](crate::SyncSet)
//! (a real shared lock).
//!
//! Lock order for binary operations: receiver (write), then left operand,
//! then right operand.

use crate::hash::HashValue;
use crate::set::{Set, Slots};
use crate::widget::{DefaultWidget, Widget};
use core::marker::PhantomData;
use core::ops::Deref;

/// Something that can hand out shared read access to a set.
pub trait ReadLock {
    type Target: ?Sized;
    type Guard<'a>: Deref<Target = Self::Target>
    where
        Self: 'a;

    fn read(&self) -> Self::Guard<'_>;
}

/// Length and membership: all a queried operand has to provide.
pub trait SetLookup {
    type Item;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn contains(&self, value: &Self::Item) -> bool;
}

/// A set whose values can be scanned.
pub trait SetRead: SetLookup {
    type Iter<'a>: Iterator<Item = &'a Self::Item>
    where
        Self: 'a;

    fn iter(&self) -> Self::Iter<'_>;

    /// Same length, and every value here is contained in `other`.
    fn unordered_eq<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetLookup<Item = Self::Item>,
    {
        let other = other.read();
        self.len() == other.len() && self.iter().all(|v| other.contains(v))
    }

    fn is_subset<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetLookup<Item = Self::Item>,
    {
        let other = other.read();
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    fn is_superset<O>(&self, other: &O) -> bool
    where
        O: ReadLock + ?Sized,
        O::Target: SetRead<Item = Self::Item>,
    {
        let other = other.read();
        self.len() >= other.len() && other.iter().all(|v| self.contains(v))
    }
}

/// Positional view of an open-addressed set.
pub trait SetSlots: SetRead {
    fn slots(&self) -> Slots<'_, Self::Item>;
    fn get_at(&self, position: HashValue) -> Option<&Self::Item>;
    fn position_of(&self, value: &Self::Item) -> Option<HashValue>;
    fn set_hash(&self) -> HashValue;
}

/// Mutable set capability. The binary operations discard the receiver's
/// prior contents and rebuild it by scanning the left operand; the right
/// operand is only scanned by `union`.
pub trait SetWrite: SetRead {
    fn append_unique(&mut self, value: Self::Item) -> bool;
    fn pop(&mut self, value: &Self::Item) -> usize;
    fn clear(&mut self);
    fn reserve(&mut self, additional: usize);

    /// `self = l ∩ r`.
    fn intersection<L, R>(&mut self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = Self::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetLookup<Item = Self::Item>,
        Self::Item: Clone,
    {
        let l = l.read();
        let r = r.read();
        self.clear();
        self.reserve((l.len() + r.len()) / 2);
        for v in l.iter().filter(|v| r.contains(v)) {
            self.append_unique(v.clone());
        }
        tracing::debug!(op = "intersection", left = l.len(), right = r.len(), len = self.len());
    }

    /// `self = l ∪ r`.
    fn union<L, R>(&mut self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = Self::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetRead<Item = Self::Item>,
        Self::Item: Clone,
    {
        let l = l.read();
        let r = r.read();
        self.clear();
        self.reserve((l.len() + r.len()) / 2);
        for v in l.iter().chain(r.iter()) {
            self.append_unique(v.clone());
        }
        tracing::debug!(op = "union", left = l.len(), right = r.len(), len = self.len());
    }

    /// `self = l \ r`.
    fn difference<L, R>(&mut self, l: &L, r: &R)
    where
        L: ReadLock + ?Sized,
        L::Target: SetRead<Item = Self::Item>,
        R: ReadLock + ?Sized,
        R::Target: SetLookup<Item = Self::Item>,
        Self::Item: Clone,
    {
        let l = l.read();
        let r = r.read();
        self.clear();
        self.reserve(l.len() / 2);
        for v in l.iter().filter(|v| !r.contains(v)) {
            self.append_unique(v.clone());
        }
        tracing::debug!(op = "difference", left = l.len(), right = r.len(), len = self.len());
    }
}

/// Widget letting a [`Set`] be an element of another set. Sets are compared
/// by contents, hashed order-independently and have no total order.
pub struct SetWidget<W = DefaultWidget>(PhantomData<fn() -> W>);

impl<T, W> Widget<Set<T, W>> for SetWidget<W>
where
    W: Widget<T>,
{
    fn eq(l: &Set<T, W>, r: &Set<T, W>) -> bool {
        l.unordered_eq(r)
    }

    fn lt(_l: &Set<T, W>, _r: &Set<T, W>) -> bool {
        panic!("sets have no total order")
    }

    fn hash(v: &Set<T, W>) -> HashValue {
        v.set_hash()
    }

    fn zero(v: &mut Set<T, W>) {
        v.clear();
    }
}
