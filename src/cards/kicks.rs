use super::rank::Rank;

/// A hand's kicker cards.
///
/// Stored as a 13-bit Rank mask. Because kicker ranks are always distinct,
/// comparing masks numerically is the same as comparing the kickers from
/// the highest down, which is exactly the poker tie-break.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Kickers(u16);

/// u16 isomorphism
impl From<Kickers> for u16 {
    fn from(k: Kickers) -> Self {
        k.0
    }
}
impl From<u16> for Kickers {
    fn from(n: u16) -> Self {
        Self(n & Rank::mask())
    }
}

/// Vec<Rank> isomorphism
///
/// [Jc, Ts, 2c]
/// xxx 0001100000001
impl From<Kickers> for Vec<Rank> {
    fn from(k: Kickers) -> Self {
        Rank::all()
            .into_iter()
            .filter(|r| k.0 & u16::from(*r) != 0)
            .collect()
    }
}
impl From<Vec<Rank>> for Kickers {
    fn from(ranks: Vec<Rank>) -> Self {
        Self(ranks.into_iter().map(u16::from).fold(0u16, |a, b| a | b))
    }
}

impl std::fmt::Display for Kickers {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for rank in Vec::<Rank>::from(*self).into_iter().rev() {
            write!(f, "{}", rank)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_top_kicker_wins() {
        let a = Kickers::from(vec![Rank::King, Rank::Four, Rank::Three]);
        let b = Kickers::from(vec![Rank::Queen, Rank::Jack, Rank::Ten]);
        assert!(a > b);
    }

    #[test]
    fn later_kicker_breaks_tie() {
        let a = Kickers::from(vec![Rank::King, Rank::Nine, Rank::Three]);
        let b = Kickers::from(vec![Rank::King, Rank::Nine, Rank::Two]);
        assert!(a > b);
    }
}
