use super::player::Player;
use super::rank::Rank;
use core::fmt;

/// Stable handle for one piece, unique across both armies of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u8);

impl PieceId {
    /// Upper bound on handles handed out in one match.
    pub const LIMIT: usize = 64;

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can stand on a square and belongs to a side.
pub trait Occupant: Copy {
    fn id(&self) -> PieceId;
    fn owner(&self) -> Player;
}

/// A fully known piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Player,
    pub rank: Rank,
}

impl Piece {
    pub const fn new(id: PieceId, owner: Player, rank: Rank) -> Self {
        Self { id, owner, rank }
    }

    /// How this piece looks to `viewer`.
    pub const fn seen_by(self, viewer: Player) -> PieceView {
        let rank = if self.owner as u8 == viewer as u8 {
            Some(self.rank)
        } else {
            None
        };
        PieceView {
            id: self.id,
            owner: self.owner,
            rank,
        }
    }
}

impl Occupant for Piece {
    fn id(&self) -> PieceId {
        self.id
    }

    fn owner(&self) -> Player {
        self.owner
    }
}

/// A piece as seen from one side; enemy ranks are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceView {
    pub id: PieceId,
    pub owner: Player,
    pub rank: Option<Rank>,
}

impl PieceView {
    pub const fn own(id: PieceId, owner: Player, rank: Rank) -> Self {
        Self {
            id,
            owner,
            rank: Some(rank),
        }
    }

    pub const fn hidden(id: PieceId, owner: Player) -> Self {
        Self {
            id,
            owner,
            rank: None,
        }
    }
}

impl Occupant for PieceView {
    fn id(&self) -> PieceId {
        self.id
    }

    fn owner(&self) -> Player {
        self.owner
    }
}

/// Bit set over piece handles.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceSet(u64);

impl PieceSet {
    pub const EMPTY: Self = Self(0);

    pub const fn contains(self, id: PieceId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    pub fn insert(&mut self, id: PieceId) -> bool {
        let before = self.0;
        self.0 |= 1 << id.0;
        before != self.0
    }

    pub fn remove(&mut self, id: PieceId) -> bool {
        let before = self.0;
        self.0 &= !(1 << id.0);
        before != self.0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn difference(self, other: PieceSet) -> PieceSet {
        PieceSet(self.0 & !other.0)
    }

    pub const fn intersection(self, other: PieceSet) -> PieceSet {
        PieceSet(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = PieceId> {
        let mut bits = self.0;
        core::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let next = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(PieceId(next))
        })
    }
}

impl FromIterator<PieceId> for PieceSet {
    fn from_iter<I: IntoIterator<Item = PieceId>>(iter: I) -> Self {
        let mut set = PieceSet::EMPTY;
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl fmt::Debug for PieceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.0)).finish()
    }
}
