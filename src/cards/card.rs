use super::rank::Rank;
use super::suit::Suit;

/// A playing card encoded as a single byte.
///
/// The 52 cards are bijectively mapped to `0..52` where the encoding is
/// `rank * 4 + suit`, so the deuces occupy the four lowest bits of a
/// [`Hand`] and the aces the four highest. A deck of `n < 52` cards is
/// therefore "the n lowest cards", which keeps synthetic decks cheap.
///
/// [`Hand`]: super::hand::Hand
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub fn rank(&self) -> Rank {
        Rank::from(self.0 / 4)
    }
    pub fn suit(&self) -> Suit {
        Suit::from(self.0 % 4)
    }
}

/// (Rank, Suit) isomorphism
impl From<(Rank, Suit)> for Card {
    fn from((r, s): (Rank, Suit)) -> Self {
        Self(u8::from(r) * 4 + u8::from(s))
    }
}

/// u8 isomorphism
/// each card is mapped to its location in a sorted deck 0-51
/// Ts
/// 35
/// 0b00100011
impl From<Card> for u8 {
    fn from(c: Card) -> u8 {
        c.0
    }
}
impl From<u8> for Card {
    fn from(n: u8) -> Self {
        assert!(n < 52, "invalid card u8: {}", n);
        Self(n)
    }
}

/// u64 representation
/// each card is just one bit turned on. this is a one-way morphism
/// Ts
/// xxxxxxxxxxxx 0000000000000000100000000000000000000000000000000000
impl From<Card> for u64 {
    fn from(c: Card) -> u64 {
        1 << u8::from(c)
    }
}

/// str isomorphism
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        match (s.get(0..1), s.get(1..)) {
            (Some(rank), Some(suit)) if !suit.is_empty() => {
                let rank = Rank::try_from(rank)?;
                let suit = Suit::try_from(suit)?;
                Ok(Card::from((rank, suit)))
            }
            _ => Err(format!("invalid card str: {}", s)),
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bijective_u8() {
        let card = Card::from((Rank::Ten, Suit::S));
        assert_eq!(u8::from(card), 35);
        assert_eq!(card, Card::from(u8::from(card)));
    }

    #[test]
    fn single_bit_u64() {
        let card = Card::try_from("Ac").unwrap();
        assert_eq!(u64::from(card), 1 << 48);
    }

    #[test]
    fn parse_str() {
        assert_eq!(
            Card::try_from("Ts"),
            Ok(Card::from((Rank::Ten, Suit::S)))
        );
        assert!(Card::try_from("T").is_err());
        assert!(Card::try_from("Tx").is_err());
    }
}
