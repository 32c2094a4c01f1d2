use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rank {
    Flag = 0,
    Private = 1,
    Sergeant = 2,
    SecondLieutenant = 3,
    FirstLieutenant = 4,
    Captain = 5,
    Major = 6,
    LieutenantColonel = 7,
    Colonel = 8,
    GeneralOne = 9,
    GeneralTwo = 10,
    GeneralThree = 11,
    GeneralFour = 12,
    GeneralFive = 13,
    Spy = 14,
}

/// Result of one rank attacking another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuelOutcome {
    AttackerWins,
    Draw,
    AttackerLoses,
}

impl DuelOutcome {
    /// The same exchange seen from the defender's side.
    pub const fn reversed(self) -> Self {
        match self {
            DuelOutcome::AttackerWins => DuelOutcome::AttackerLoses,
            DuelOutcome::Draw => DuelOutcome::Draw,
            DuelOutcome::AttackerLoses => DuelOutcome::AttackerWins,
        }
    }
}

impl Rank {
    pub const COUNT: usize = 15;

    pub const ORDERED: [Rank; Rank::COUNT] = [
        Rank::Flag,
        Rank::Private,
        Rank::Sergeant,
        Rank::SecondLieutenant,
        Rank::FirstLieutenant,
        Rank::Captain,
        Rank::Major,
        Rank::LieutenantColonel,
        Rank::Colonel,
        Rank::GeneralOne,
        Rank::GeneralTwo,
        Rank::GeneralThree,
        Rank::GeneralFour,
        Rank::GeneralFive,
        Rank::Spy,
    ];

    /// Total number of pieces in one army.
    pub const ARMY_SIZE: usize = 21;

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Rank::Flag),
            1 => Some(Rank::Private),
            2 => Some(Rank::Sergeant),
            3 => Some(Rank::SecondLieutenant),
            4 => Some(Rank::FirstLieutenant),
            5 => Some(Rank::Captain),
            6 => Some(Rank::Major),
            7 => Some(Rank::LieutenantColonel),
            8 => Some(Rank::Colonel),
            9 => Some(Rank::GeneralOne),
            10 => Some(Rank::GeneralTwo),
            11 => Some(Rank::GeneralThree),
            12 => Some(Rank::GeneralFour),
            13 => Some(Rank::GeneralFive),
            14 => Some(Rank::Spy),
            _ => None,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// How many pieces of this rank each army fields.
    pub const fn quota(self) -> u8 {
        match self {
            Rank::Private => 6,
            Rank::Spy => 2,
            _ => 1,
        }
    }

    /// Resolves `self` attacking `defender`.
    pub const fn duel(self, defender: Rank) -> DuelOutcome {
        match (self, defender) {
            (_, Rank::Flag) => DuelOutcome::AttackerWins,
            (Rank::Private, Rank::Spy) => DuelOutcome::AttackerWins,
            (Rank::Spy, Rank::Private) => DuelOutcome::AttackerLoses,
            _ if self.value() == defender.value() => DuelOutcome::Draw,
            _ if self.value() > defender.value() => DuelOutcome::AttackerWins,
            _ => DuelOutcome::AttackerLoses,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Rank::Flag => "FLG",
            Rank::Private => "PVT",
            Rank::Sergeant => "SGT",
            Rank::SecondLieutenant => "2LT",
            Rank::FirstLieutenant => "1LT",
            Rank::Captain => "CPT",
            Rank::Major => "MAJ",
            Rank::LieutenantColonel => "LTC",
            Rank::Colonel => "COL",
            Rank::GeneralOne => "1GN",
            Rank::GeneralTwo => "2GN",
            Rank::GeneralThree => "3GN",
            Rank::GeneralFour => "4GN",
            Rank::GeneralFive => "5GN",
            Rank::Spy => "SPY",
        };
        f.write_str(text)
    }
}
