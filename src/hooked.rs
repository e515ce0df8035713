//! HookedSet: a [`Set`] that reports every structural change to an
//! observer, so structures holding positions into the set can follow
//! relocations instead of rescanning.
//!
//! Hooks run synchronously after the set is consistent again (before the
//! storage is emptied, for `clear_op`). A panicking hook cannot leave the
//! set half-mutated.

use crate::algebra::{ReadLock, SetLookup, SetRead, SetSlots, SetWrite};
use crate::hash::HashValue;
use crate::set::{Iter, Set, SetError, Slots};
use crate::widget::{DefaultWidget, Widget};
use hashbrown::HashMap;

/// Old position -> new position for every slot moved by a chain repair.
pub type Relocations = HashMap<HashValue, HashValue>;

/// Observer of a [`HookedSet`].
pub trait Hooks {
    /// A new value now lives at `slot`.
    fn add_op(&mut self, slot: HashValue);

    /// The value at `deleted` was removed; `relocations` lists every slot
    /// that moved to close the gap, and nothing else.
    fn delete_op(&mut self, deleted: HashValue, relocations: &Relocations);

    /// Every value is about to be dropped. Not fired when the set is
    /// already empty.
    fn clear_op(&mut self);
}

/// Hooks that ignore every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl Hooks for NoHooks {
    fn add_op(&mut self, _slot: HashValue) {}
    fn delete_op(&mut self, _deleted: HashValue, _relocations: &Relocations) {}
    fn clear_op(&mut self) {}
}

pub struct HookedSet<T, H, W = DefaultWidget> {
    set: Set<T, W>,
    hooks: H,
}

impl<T, H, W> HookedSet<T, H, W> {
    pub fn new(hooks: H) -> Self {
        Self {
            set: Set::new(),
            hooks,
        }
    }

    pub fn with_capacity(hooks: H, capacity: usize) -> Self {
        Self {
            set: Set::with_capacity(capacity),
            hooks,
        }
    }

    pub fn try_with_capacity(hooks: H, hint: isize) -> Result<Self, SetError> {
        Ok(Self {
            set: Set::try_with_capacity(hint)?,
            hooks,
        })
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Read-only view of the underlying set.
    pub fn as_set(&self) -> &Set<T, W> {
        &self.set
    }

    pub fn into_parts(self) -> (Set<T, W>, H) {
        (self.set, self.hooks)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.set.iter()
    }

    pub fn slots(&self) -> Slots<'_, T> {
        self.set.slots()
    }

    pub fn get_at(&self, position: HashValue) -> Option<&T> {
        self.set.get_at(position)
    }
}

impl<T, H, W> HookedSet<T, H, W>
where
    H: Hooks,
    W: Widget<T>,
{
    pub fn contains(&self, value: &T) -> bool {
        self.set.contains(value)
    }

    pub fn position_of(&self, value: &T) -> Option<HashValue> {
        self.set.position_of(value)
    }

    /// Insert `value` unless present; fires `add_op` with its final position.
    pub fn append_unique(&mut self, value: T) -> bool {
        match self.set.insert_value(value) {
            Some(slot) => {
                self.hooks.add_op(slot);
                true
            }
            None => false,
        }
    }

    pub fn append_unique_all<I>(&mut self, values: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0;
        for v in values {
            if self.append_unique(v) {
                added += 1;
            }
        }
        added
    }

    /// Remove the value equal to `value`; fires `delete_op` with the
    /// relocations produced by chain repair.
    pub fn pop(&mut self, value: &T) -> usize {
        let Some(deleted) = self.set.position_of(value) else {
            return 0;
        };
        let mut relocations = Relocations::new();
        let Some(mut removed) = self.set.remove_at(deleted, |old, new| {
            relocations.insert(old, new);
        }) else {
            return 0;
        };
        W::zero(&mut removed);
        drop(removed);
        self.hooks.delete_op(deleted, &relocations);
        1
    }

    /// Fires `clear_op`, then clears the set. Clearing an empty set is a
    /// no-op and fires nothing.
    pub fn clear(&mut self) {
        if self.set.is_empty() {
            return;
        }
        self.hooks.clear_op();
        self.set.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.set.reserve(additional);
    }

    pub fn set_hash(&self) -> HashValue {
        self.set.set_hash()
    }
}

impl<T, H, W> Default for HookedSet<T, H, W>
where
    H: Default,
{
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<T, H, W> ReadLock for HookedSet<T, H, W> {
    type Target = Self;
    type Guard<'a>
        = &'a Self
    where
        Self: 'a;

    #[inline]
    fn read(&self) -> Self::Guard<'_> {
        self
    }
}

impl<T, H, W> SetLookup for HookedSet<T, H, W>
where
    H: Hooks,
    W: Widget<T>,
{
    type Item = T;

    fn len(&self) -> usize {
        self.set.len()
    }
    fn contains(&self, value: &T) -> bool {
        self.set.contains(value)
    }
}

impl<T, H, W> SetRead for HookedSet<T, H, W>
where
    H: Hooks,
    W: Widget<T>,
{
    type Iter<'a>
        = Iter<'a, T>
    where
        Self: 'a;

    fn iter(&self) -> Iter<'_, T> {
        self.set.iter()
    }
}

impl<T, H, W> SetSlots for HookedSet<T, H, W>
where
    H: Hooks,
    W: Widget<T>,
{
    fn slots(&self) -> Slots<'_, T> {
        self.set.slots()
    }
    fn get_at(&self, position: HashValue) -> Option<&T> {
        self.set.get_at(position)
    }
    fn position_of(&self, value: &T) -> Option<HashValue> {
        self.set.position_of(value)
    }
    fn set_hash(&self) -> HashValue {
        self.set.set_hash()
    }
}

impl<T, H, W> SetWrite for HookedSet<T, H, W>
where
    H: Hooks,
    W: Widget<T>,
{
    fn append_unique(&mut self, value: T) -> bool {
        HookedSet::append_unique(self, value)
    }
    fn pop(&mut self, value: &T) -> usize {
        HookedSet::pop(self, value)
    }
    fn clear(&mut self) {
        HookedSet::clear(self)
    }
    fn reserve(&mut self, additional: usize) {
        HookedSet::reserve(self, additional)
    }
}
