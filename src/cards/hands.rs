use super::hand::Hand;

/// Binomial coefficient C(n, k), or None if it does not fit in a u64.
pub const fn choose(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = if k > n - k { n - k } else { k };
    let mut x = 1u64;
    let mut i = 0;
    while i < k {
        // x * (n - i) is divisible by (i + 1) at every step
        x = match x.checked_mul((n - i) as u64) {
            Some(y) => y / (i as u64 + 1),
            None => return None,
        };
        i += 1;
    }
    Some(x)
}

/// Combinatorial iterator over all k-card hands from a deck.
///
/// Generates all C(n, k) combinations of k cards from the n lowest cards of
/// the deck. Uses bit-twiddling to generate successive permutations
/// without storing them in memory.
///
/// # Order
///
/// Hands come out in increasing bitmap order, which is colexicographic
/// order over card indices. [`Hand::unrank`] inverts this order so that
/// an enumeration can be resumed (or partitioned) at any index.
///
/// # Performance
///
/// - Memory: O(1), only the current state is kept
/// - Time per `.next()`: O(1) amortized via Gosper's hack
pub struct HandIterator {
    next: u64,
    deck: u32,
}

impl HandIterator {
    /// all k-card hands drawn from the n lowest cards
    pub fn within(k: usize, n: usize) -> Self {
        assert!(n <= 52, "deck of {} cards", n);
        let mut this = Self {
            next: if k == 0 { 0 } else { (1u64 << k) - 1 },
            deck: n as u32,
        };
        if k > n {
            this.next = 0;
        }
        this
    }

    /// resume a `within(k, n)` enumeration at the given index
    pub fn resume(k: usize, n: usize, index: u64) -> Self {
        let mut this = Self::within(k, n);
        if this.next != 0 {
            this.next = u64::from(Hand::unrank(k, index));
        }
        this
    }

    fn exhausted(&self) -> bool {
        self.next == 0 || self.next >> self.deck != 0
    }

    /// Gosper's hack for next bit permutation with same popcount.
    ///
    /// See: https://graphics.stanford.edu/~seander/bithacks.html#NextBitPermutation
    fn permute(&self) -> u64 {
        let  x = /* 000_100                       */ self.next;
        let  a = /* 000_111 <- 000_100 || 000_110 */ x | (x - 1);
        let  b = /* 001_000 <-                    */ a + 1;
        let  c = /* 111_000 <-                    */ !   a;
        let  d = /* 001_000 <- 111_000 && 001_000 */ c & b;
        let  e = /* 000_111 <-                    */ d - 1;
        let  f = /*         << xxx                */ 1 + x.trailing_zeros();
        let  g = /* 000_000 <-                    */ e >> f;
        let  h = /* 001_000 <- 001_000 || 000_000 */ b | g;
        h
    }
}

impl Iterator for HandIterator {
    type Item = Hand;
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted() {
            None
        } else {
            let last = Hand::from(self.next);
            self.next = self.permute();
            Some(last)
        }
    }
}

impl Hand {
    /// Inverse of the enumeration order: the k-card Hand at position
    /// `index` of `HandIterator::within(k, _)`.
    ///
    /// Colex rank of cards c1 < c2 < ... < ck is the sum of C(ci, i).
    /// We peel off the highest card first, greedily.
    pub fn unrank(k: usize, index: u64) -> Self {
        let mut bits = 0u64;
        let mut rest = index;
        let mut high = 52;
        for i in (1..=k).rev() {
            let mut c = i - 1;
            while c + 1 < high && choose(c + 1, i).unwrap_or(u64::MAX) <= rest {
                c += 1;
            }
            rest -= choose(c, i).unwrap_or(0);
            bits |= 1u64 << c;
            high = c;
        }
        Self::from(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomials() {
        assert_eq!(choose(52, 5), Some(2_598_960));
        assert_eq!(choose(52, 6), Some(20_358_520));
        assert_eq!(choose(52, 7), Some(133_784_560));
        assert_eq!(choose(5, 7), Some(0));
        assert_eq!(choose(7, 0), Some(1));
        assert_eq!(choose(100, 50), None);
    }

    #[test]
    fn n_choose_2() {
        let iter = HandIterator::within(2, 52);
        assert_eq!(iter.count(), 1326);
    }

    #[test]
    fn choose_3() {
        let mut iter = HandIterator::within(3, 5);
        assert!(iter.next() == Some(Hand::from(0b00111)));
        assert!(iter.next() == Some(Hand::from(0b01011)));
        assert!(iter.next() == Some(Hand::from(0b01101)));
        assert!(iter.next() == Some(Hand::from(0b01110)));
        assert!(iter.next() == Some(Hand::from(0b10011)));
        assert!(iter.next() == Some(Hand::from(0b10101)));
        assert!(iter.next() == Some(Hand::from(0b10110)));
        assert!(iter.next() == Some(Hand::from(0b11001)));
        assert!(iter.next() == Some(Hand::from(0b11010)));
        assert!(iter.next() == Some(Hand::from(0b11100)));
        assert!(iter.next() == None);
    }

    #[test]
    fn synthetic_deck_counts() {
        assert_eq!(HandIterator::within(5, 20).count() as u64, choose(20, 5).unwrap());
        assert_eq!(HandIterator::within(7, 16).count() as u64, choose(16, 7).unwrap());
        assert_eq!(HandIterator::within(7, 6).count(), 0);
        assert!(HandIterator::within(6, 18).all(|h| u64::from(h) >> 18 == 0));
    }

    #[test]
    fn increasing_and_distinct() {
        let hands = HandIterator::within(4, 14).collect::<Vec<Hand>>();
        assert!(hands.windows(2).all(|w| w[0] < w[1]));
        assert!(hands.iter().all(|h| h.size() == 4));
    }

    #[test]
    fn unrank_inverts_enumeration() {
        for (i, hand) in HandIterator::within(5, 16).enumerate() {
            assert_eq!(Hand::unrank(5, i as u64), hand);
        }
    }

    #[test]
    fn resume_midway() {
        let all = HandIterator::within(6, 15).collect::<Vec<Hand>>();
        let tail = HandIterator::resume(6, 15, 1000).collect::<Vec<Hand>>();
        assert_eq!(&all[1000..], &tail[..]);
    }

    #[test]
    fn unrank_last_of_full_deck() {
        let last = choose(52, 7).unwrap() - 1;
        assert_eq!(u64::from(Hand::unrank(7, last)), 0b1111111 << 45);
    }
}
