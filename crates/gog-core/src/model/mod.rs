pub mod board;
pub mod event;
pub mod piece;
pub mod player;
pub mod position;
pub mod rank;
pub mod rank_set;
pub mod roster;
pub mod rules;
