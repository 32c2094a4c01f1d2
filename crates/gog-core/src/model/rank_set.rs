use super::rank::Rank;
use core::fmt;

/// Bit set over the fifteen ranks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RankSet(u16);

impl RankSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self((1 << Rank::COUNT) - 1);

    pub const fn single(rank: Rank) -> Self {
        Self(1 << rank as u16)
    }

    pub const fn contains(self, rank: Rank) -> bool {
        self.0 & (1 << rank as u16) != 0
    }

    pub const fn with(self, rank: Rank) -> Self {
        Self(self.0 | (1 << rank as u16))
    }

    pub const fn without(self, rank: Rank) -> Self {
        Self(self.0 & !(1 << rank as u16))
    }

    pub fn insert(&mut self, rank: Rank) -> bool {
        let before = self.0;
        *self = self.with(rank);
        before != self.0
    }

    pub fn remove(&mut self, rank: Rank) -> bool {
        let before = self.0;
        *self = self.without(rank);
        before != self.0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the rank when exactly one is left.
    pub fn only(self) -> Option<Rank> {
        if self.len() == 1 {
            Rank::from_value(self.0.trailing_zeros() as u8)
        } else {
            None
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Rank> {
        Rank::ORDERED
            .into_iter()
            .filter(move |rank| self.contains(*rank))
    }

    /// The `n`-th member in ascending order.
    pub fn nth(self, n: usize) -> Option<Rank> {
        self.iter().nth(n)
    }
}

impl FromIterator<Rank> for RankSet {
    fn from_iter<I: IntoIterator<Item = Rank>>(iter: I) -> Self {
        iter.into_iter().fold(RankSet::EMPTY, RankSet::with)
    }
}

impl fmt::Debug for RankSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
