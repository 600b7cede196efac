use crate::cards::Hand;
use crate::cards::Strength;

/// Maps a 5-card hand to a totally ordered strength.
///
/// The table only ever compares strengths for order and equality, so any
/// total order works. The signature identifies the order in artifact
/// headers: two comparators with the same signature must agree on every
/// hand, and a table built under one signature is never served under another.
pub trait Comparator: Sync {
    type Strength: Ord + Copy + Send + Sync;
    fn strength(&self, hand: Hand) -> Self::Strength;
    fn signature(&self) -> u64;
}

/// Standard high-hand poker: category first, then kickers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Holdem;

impl Comparator for Holdem {
    type Strength = Strength;
    fn strength(&self, hand: Hand) -> Strength {
        Strength::from(hand)
    }
    fn signature(&self) -> u64 {
        // "holdem01"
        0x686F6C64656D3031
    }
}
