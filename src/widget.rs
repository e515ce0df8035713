//! Widget: the stateless equality/order/hash/reset capability a [`Set`]
//! is parameterized by.
//!
//! A widget is a type, never a value. Its methods are associated functions,
//! so there is no state to retain between calls and the same widget can be
//! used from any number of concurrent readers.
//!
//! [`Set`]: crate::Set

use crate::hash::HashValue;
use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::DefaultHasher;

/// Equality, ordering, hashing and reset behavior for values of type `T`.
///
/// Implementations must keep `hash` congruent with `eq`: whenever
/// `eq(a, b)` holds, `hash(a) == hash(b)`. Probing is undefined otherwise.
pub trait Widget<T: ?Sized> {
    fn eq(l: &T, r: &T) -> bool;

    /// Strict order. Types without a total order panic here.
    fn lt(l: &T, r: &T) -> bool;

    fn hash(v: &T) -> HashValue;

    /// Reset `v` to a neutral state before it is discarded.
    fn zero(v: &mut T);
}

/// Widget for ordinary value types, delegating to `Eq`, `Ord`, `Hash` and
/// `Default`. Hashes go through `S`, which must build identical hashers on
/// every call; the default is SipHash with fixed keys.
pub struct DefaultWidget<S = BuildHasherDefault<DefaultHasher>>(PhantomData<fn() -> S>);

impl<T, S> Widget<T> for DefaultWidget<S>
where
    T: Eq + Ord + Hash + Default,
    S: BuildHasher + Default,
{
    #[inline]
    fn eq(l: &T, r: &T) -> bool {
        l == r
    }

    #[inline]
    fn lt(l: &T, r: &T) -> bool {
        l < r
    }

    #[inline]
    fn hash(v: &T) -> HashValue {
        HashValue::new(S::default().hash_one(v))
    }

    #[inline]
    fn zero(v: &mut T) {
        *v = T::default();
    }
}
