//! HashValue: a position in the unbounded probe space plus the folding
//! operators used to hash sequences and sets.

use core::fmt;

/// Odd mixing constant for the ordered fold (64-bit golden ratio).
const MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Fixed-width hash, doubling as a slot position in a [`Set`](crate::Set).
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HashValue(u64);

impl HashValue {
    pub const ZERO: HashValue = HashValue(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        HashValue(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Next position of a probe sequence; wraps at the end of the space.
    #[inline]
    pub(crate) const fn next(self) -> Self {
        HashValue(self.0.wrapping_add(1))
    }

    /// Number of probe steps from `self` forward to `to`.
    #[inline]
    pub(crate) const fn distance_to(self, to: HashValue) -> u64 {
        to.0.wrapping_sub(self.0)
    }

    #[inline]
    fn mix(self, other: HashValue) -> Self {
        let h = self.0;
        HashValue(
            h ^ other
                .0
                .wrapping_add(MIX)
                .wrapping_add(h << 6)
                .wrapping_add(h >> 2),
        )
    }

    /// Order-sensitive fold: `h' = h ^ (o + K + (h << 6) + (h >> 2))`.
    pub fn combine<I>(self, others: I) -> Self
    where
        I: IntoIterator<Item = HashValue>,
    {
        others.into_iter().fold(self, HashValue::mix)
    }

    /// Commutative, associative fold (`h' = h ^ o`).
    pub fn combine_unordered<I>(self, others: I) -> Self
    where
        I: IntoIterator<Item = HashValue>,
    {
        others.into_iter().fold(self, |h, o| HashValue(h.0 ^ o.0))
    }

    /// Like [`combine`](Self::combine), but a zero running hash adopts the
    /// next value unchanged.
    pub fn combine_ignore_zero<I>(self, others: I) -> Self
    where
        I: IntoIterator<Item = HashValue>,
    {
        others
            .into_iter()
            .fold(self, |h, o| if h.is_zero() { o } else { h.mix(o) })
    }

    /// Like [`combine_unordered`](Self::combine_unordered), but a zero
    /// running hash adopts the next value unchanged.
    pub fn combine_unordered_ignore_zero<I>(self, others: I) -> Self
    where
        I: IntoIterator<Item = HashValue>,
    {
        others.into_iter().fold(self, |h, o| {
            if h.is_zero() {
                o
            } else {
                HashValue(h.0 ^ o.0)
            }
        })
    }
}

impl From<u64> for HashValue {
    fn from(raw: u64) -> Self {
        HashValue(raw)
    }
}

impl From<HashValue> for u64 {
    fn from(h: HashValue) -> Self {
        h.0
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({:#x})", self.0)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
