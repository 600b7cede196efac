use super::error::Error;
use super::error::Result;
use super::map::PackedMap;

/// One frozen [`PackedMap`] per hand size, starting at five cards.
///
/// Phases are only ever appended, in order, so `maps[i]` always holds
/// the `5 + i` card hands and the table is valid after any prefix.
#[derive(Debug, Clone)]
pub struct Table {
    deck: usize,
    classes: u32,
    maps: Vec<PackedMap>,
}

impl Table {
    /// a table holding only the canonicalized five-card phase
    pub fn new(deck: usize, classes: u32, five: PackedMap) -> Self {
        Self {
            deck,
            classes,
            maps: vec![five],
        }
    }

    pub fn deck(&self) -> usize {
        self.deck
    }
    /// number of strength classes among five-card hands
    pub fn classes(&self) -> u32 {
        self.classes
    }
    /// largest hand size with a completed phase
    pub fn largest(&self) -> usize {
        crate::SMALLEST_HAND + self.maps.len() - 1
    }
    pub fn phase(&self, cards: usize) -> Option<&PackedMap> {
        cards
            .checked_sub(crate::SMALLEST_HAND)
            .and_then(|i| self.maps.get(i))
    }
    /// (cards, map) for every completed phase
    pub fn phases(&self) -> impl Iterator<Item = (usize, &PackedMap)> {
        self.maps
            .iter()
            .enumerate()
            .map(|(i, map)| (crate::SMALLEST_HAND + i, map))
    }
    pub fn last(&self) -> &PackedMap {
        &self.maps[self.maps.len() - 1]
    }

    /// append the next phase
    pub fn push(&mut self, map: PackedMap) {
        self.maps.push(map);
    }

    /// Stored rank of a hand, dispatched on its card count.
    #[inline]
    pub fn get(&self, hand: u64) -> Result<u64> {
        let cards = hand.count_ones();
        match self.phase(cards as usize) {
            Some(map) => map.get(hand),
            None => Err(Error::Unsupported { hand, cards }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_popcount() {
        let mut five = PackedMap::new(4, 1);
        five.insert(0b11111, 3).unwrap();
        let mut six = PackedMap::new(4, 1);
        six.insert(0b111111, 4).unwrap();
        let mut table = Table::new(6, 4, five);
        assert_eq!(table.largest(), 5);
        table.push(six);
        assert_eq!(table.largest(), 6);
        assert_eq!(table.get(0b11111).unwrap(), 3);
        assert_eq!(table.get(0b111111).unwrap(), 4);
        assert!(matches!(
            table.get(0b1111111),
            Err(Error::Unsupported { cards: 7, .. })
        ));
        assert!(matches!(
            table.get(0b1111),
            Err(Error::Unsupported { cards: 4, .. })
        ));
        assert!(table.phase(0).is_none());
    }
}
