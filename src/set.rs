//! Set: open-addressed unique-value storage over the full `u64` probe space.
//!
//! Positions are keys of a sparse index rather than offsets into a bucket
//! array, so there is no load factor and no rehash. A value with home hash
//! `h` lives at the first free position of `h, h+1, h+2, ...` at the time it
//! was inserted; removal closes the gap it leaves by shifting later members
//! of the chain backward.

use crate::algebra::{ReadLock, SetLookup, SetRead, SetSlots, SetWrite};
use crate::hash::HashValue;
use crate::widget::{DefaultWidget, Widget};
use core::fmt;
use core::marker::PhantomData;
use hashbrown::HashMap;
use slotmap::{DefaultKey, SlotMap};

/// Construction failure; the only error the engine reports.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SetError {
    NegativeCapacity(isize),
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetError::NegativeCapacity(hint) => {
                write!(f, "capacity hint must be non-negative, got {}", hint)
            }
        }
    }
}

impl std::error::Error for SetError {}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    // Home position, computed once at insertion.
    hash: HashValue,
    position: HashValue,
}

pub struct Set<T, W = DefaultWidget> {
    index: HashMap<HashValue, DefaultKey>, // occupied position -> storage key
    slots: SlotMap<DefaultKey, Slot<T>>,
    _widget: PhantomData<fn() -> W>,
}

/// Iterator over the values of a set, in no particular order.
pub struct Iter<'a, T> {
    it: slotmap::basic::Values<'a, DefaultKey, Slot<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|s| &s.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(position, value)` pairs.
pub struct Slots<'a, T> {
    it: slotmap::basic::Values<'a, DefaultKey, Slot<T>>,
}

impl<'a, T> Iterator for Slots<'a, T> {
    type Item = (HashValue, &'a T);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|s| (s.position, &s.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<T, W> Set<T, W> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            _widget: PhantomData,
        }
    }

    /// Pre-sized constructor taking a signed hint; negative hints are rejected.
    pub fn try_with_capacity(hint: isize) -> Result<Self, SetError> {
        let capacity = usize::try_from(hint).map_err(|_| SetError::NegativeCapacity(hint))?;
        Ok(Self::with_capacity(capacity))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            it: self.slots.values(),
        }
    }

    pub fn slots(&self) -> Slots<'_, T> {
        Slots {
            it: self.slots.values(),
        }
    }

    /// Value stored at `position`, if occupied.
    pub fn get_at(&self, position: HashValue) -> Option<&T> {
        let &key = self.index.get(&position)?;
        self.slots.get(key).map(|s| &s.value)
    }

    pub fn reserve(&mut self, additional: usize) {
        self.index.reserve(additional);
        self.slots.reserve(additional);
    }
}

impl<T, W> Set<T, W>
where
    W: Widget<T>,
{
    fn locate(&self, value: &T) -> Option<HashValue> {
        let hash = W::hash(value);
        let mut position = hash;
        loop {
            let &key = self.index.get(&position)?;
            if let Some(slot) = self.slots.get(key) {
                if slot.hash == hash && W::eq(value, &slot.value) {
                    return Some(position);
                }
            }
            position = position.next();
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.locate(value).is_some()
    }

    /// Position currently holding a value equal to `value`.
    pub fn position_of(&self, value: &T) -> Option<HashValue> {
        self.locate(value)
    }

    /// Store `value` at the first free position of its probe sequence.
    /// Returns the position when the value was new, `None` for a duplicate.
    pub(crate) fn insert_value(&mut self, value: T) -> Option<HashValue> {
        let hash = W::hash(&value);
        let mut position = hash;
        while let Some(&key) = self.index.get(&position) {
            if let Some(slot) = self.slots.get(key) {
                if slot.hash == hash && W::eq(&value, &slot.value) {
                    return None;
                }
            }
            position = position.next();
        }
        let key = self.slots.insert(Slot {
            value,
            hash,
            position,
        });
        self.index.insert(position, key);
        Some(position)
    }

    /// Remove the value at `position` and repair the chain behind it.
    /// `on_move(old, new)` is called once per relocated slot.
    pub(crate) fn remove_at<F>(&mut self, position: HashValue, mut on_move: F) -> Option<T>
    where
        F: FnMut(HashValue, HashValue),
    {
        let key = self.index.remove(&position)?;
        let slot = self.slots.remove(key)?;
        let moved = self.repair(position, &mut on_move);
        tracing::trace!(position = position.get(), moved, "removed value, repaired probe chain");
        Some(slot.value)
    }

    fn repair<F>(&mut self, hole: HashValue, on_move: &mut F) -> usize
    where
        F: FnMut(HashValue, HashValue),
    {
        let mut free = hole;
        let mut probe = hole.next();
        let mut moved = 0;
        while let Some(&key) = self.index.get(&probe) {
            if let Some(slot) = self.slots.get_mut(key) {
                // The free slot lies on this value's path from its home to
                // `probe` iff it is no further from `probe` than the home is.
                if slot.hash.distance_to(probe) >= free.distance_to(probe) {
                    slot.position = free;
                    self.index.remove(&probe);
                    self.index.insert(free, key);
                    on_move(probe, free);
                    free = probe;
                    moved += 1;
                }
            }
            probe = probe.next();
        }
        moved
    }

    /// Insert `value` unless an equal value is present. Returns whether it
    /// was inserted.
    pub fn append_unique(&mut self, value: T) -> bool {
        self.insert_value(value).is_some()
    }

    /// Insert every value; returns how many were new.
    pub fn append_unique_all<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .filter_map(|v| self.insert_value(v))
            .count()
    }

    /// Remove the value equal to `value`. Returns 1 if one was removed, 0
    /// otherwise.
    pub fn pop(&mut self, value: &T) -> usize {
        let removed = self
            .locate(value)
            .and_then(|position| self.remove_at(position, |_, _| {}));
        match removed {
            Some(mut v) => {
                W::zero(&mut v);
                1
            }
            None => 0,
        }
    }

    /// Reset every value through the widget, then drop them all.
    pub fn clear(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        tracing::debug!(len = self.slots.len(), "clearing set");
        for slot in self.slots.values_mut() {
            W::zero(&mut slot.value);
        }
        self.slots.clear();
        self.index.clear();
    }

    /// Order-independent hash of the contents.
    pub fn set_hash(&self) -> HashValue {
        HashValue::ZERO.combine_unordered(self.slots.values().map(|s| s.hash))
    }

    /// Check the positional invariant: every value sits at the first
    /// position of its probe sequence not taken by an earlier chain member.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        if self.index.len() != self.slots.len() {
            return Err(format!(
                "index has {} positions but {} values are stored",
                self.index.len(),
                self.slots.len()
            ));
        }
        for (key, slot) in self.slots.iter() {
            if self.index.get(&slot.position) != Some(&key) {
                return Err(format!("value at {} is not indexed there", slot.position));
            }
            if W::hash(&slot.value) != slot.hash {
                return Err(format!("stale home hash for value at {}", slot.position));
            }
            let mut p = slot.hash;
            while p != slot.position {
                let &k = self
                    .index
                    .get(&p)
                    .ok_or_else(|| format!("gap at {} before value at {}", p, slot.position))?;
                if W::eq(&self.slots[k].value, &slot.value) {
                    return Err(format!("duplicate of value at {} found at {}", slot.position, p));
                }
                p = p.next();
            }
        }
        Ok(())
    }
}

impl<T, W> Default for Set<T, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, W> ReadLock for Set<T, W> {
    type Target = Self;
    type Guard<'a>
        = &'a Self
    where
        Self: 'a;

    /// No lock to take; the borrow checker already serializes access.
    #[inline]
    fn read(&self) -> Self::Guard<'_> {
        self
    }
}

impl<T, W> SetLookup for Set<T, W>
where
    W: Widget<T>,
{
    type Item = T;

    fn len(&self) -> usize {
        Set::len(self)
    }
    fn contains(&self, value: &T) -> bool {
        Set::contains(self, value)
    }
}

impl<T, W> SetRead for Set<T, W>
where
    W: Widget<T>,
{
    type Iter<'a>
        = Iter<'a, T>
    where
        Self: 'a;

    fn iter(&self) -> Iter<'_, T> {
        Set::iter(self)
    }
}

impl<T, W> SetSlots for Set<T, W>
where
    W: Widget<T>,
{
    fn slots(&self) -> Slots<'_, T> {
        Set::slots(self)
    }
    fn get_at(&self, position: HashValue) -> Option<&T> {
        Set::get_at(self, position)
    }
    fn position_of(&self, value: &T) -> Option<HashValue> {
        Set::position_of(self, value)
    }
    fn set_hash(&self) -> HashValue {
        Set::set_hash(self)
    }
}

impl<T, W> SetWrite for Set<T, W>
where
    W: Widget<T>,
{
    fn append_unique(&mut self, value: T) -> bool {
        Set::append_unique(self, value)
    }
    fn pop(&mut self, value: &T) -> usize {
        Set::pop(self, value)
    }
    fn clear(&mut self) {
        Set::clear(self)
    }
    fn reserve(&mut self, additional: usize) {
        Set::reserve(self, additional)
    }
}

impl<T, W> PartialEq for Set<T, W>
where
    W: Widget<T>,
{
    fn eq(&self, other: &Self) -> bool {
        self.unordered_eq(other)
    }
}

impl<T, W> Eq for Set<T, W> where W: Widget<T> {}

impl<T, W> core::hash::Hash for Set<T, W>
where
    W: Widget<T>,
{
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.set_hash().get());
    }
}

impl<T, W> fmt::Debug for Set<T, W>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, W> Extend<T> for Set<T, W>
where
    W: Widget<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_unique_all(iter);
    }
}

impl<T, W> FromIterator<T> for Set<T, W>
where
    W: Widget<T>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity(iter.size_hint().0);
        set.append_unique_all(iter);
        set
    }
}

impl<'a, T, W> IntoIterator for &'a Set<T, W> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
