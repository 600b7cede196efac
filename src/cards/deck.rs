use super::card::Card;
use super::hand::Hand;
use rand::Rng;

/// Deck extends much of Hand functionality, with ability to remove cards from itself.
/// Random selection via ::draw(), used to sample hands for spot checks.
#[derive(Debug, Clone, Copy)]
pub struct Deck(Hand);

impl From<Deck> for Hand {
    fn from(deck: Deck) -> Self {
        deck.0
    }
}
impl From<Hand> for Deck {
    fn from(hand: Hand) -> Self {
        Self(hand)
    }
}

impl Deck {
    pub fn new() -> Self {
        Self(Hand::from(Hand::mask()))
    }
    /// the n lowest cards
    pub fn truncated(n: usize) -> Self {
        assert!(n <= 52, "deck of {} cards", n);
        Self(Hand::from((1u64 << n) - 1))
    }
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// remove a random card from the deck
    pub fn draw(&mut self, rng: &mut impl Rng) -> Card {
        assert!(self.0.size() > 0);
        let n = self.0.size();
        let i = rng.random_range(0..n);
        let mut cards = self.0;
        let card = cards.nth(i).expect("index within deck size");
        self.0.remove(card);
        card
    }

    /// remove n random cards from the deck
    pub fn deal(&mut self, n: usize, rng: &mut impl Rng) -> Hand {
        (0..n)
            .map(|_| self.draw(rng))
            .map(u64::from)
            .fold(Hand::empty(), |hand, card| Hand::add(hand, Hand::from(card)))
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn deal_removes_cards() {
        let ref mut rng = SmallRng::seed_from_u64(7);
        let mut deck = Deck::new();
        let hand = deck.deal(7, rng);
        assert_eq!(hand.size(), 7);
        assert_eq!(deck.size(), 45);
        assert_eq!(u64::from(hand) & u64::from(Hand::from(deck)), 0);
    }

    #[test]
    fn truncated_deck_stays_low() {
        let ref mut rng = SmallRng::seed_from_u64(11);
        let hand = Deck::truncated(20).deal(6, rng);
        assert_eq!(u64::from(hand) >> 20, 0);
    }
}
