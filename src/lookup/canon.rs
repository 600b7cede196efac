/// Sorted, duplicate-free list of strengths. A strength's position in the
/// list is its rank, so ranks are dense and ordered by strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canon<S>(Vec<S>);

impl<S> Default for Canon<S> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<S: Ord + Copy> Canon<S> {
    /// binary insertion, ignoring strengths already present
    pub fn insert(&mut self, strength: S) {
        if let Err(i) = self.0.binary_search(&strength) {
            self.0.insert(i, strength);
        }
    }

    /// dense ordinal of a strength, if it was ever inserted
    pub fn rank(&self, strength: &S) -> Option<u64> {
        self.0.binary_search(strength).ok().map(|i| i as u64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// union of two canonical lists, still sorted and unique
    pub fn merge(self, other: Self) -> Self {
        let mut merged = Vec::with_capacity(self.0.len().max(other.0.len()));
        let mut lhs = self.0.into_iter().peekable();
        let mut rhs = other.0.into_iter().peekable();
        loop {
            let next = match (lhs.peek(), rhs.peek()) {
                (None, None) => break,
                (Some(_), None) => lhs.next(),
                (None, Some(_)) => rhs.next(),
                (Some(a), Some(b)) => match a.cmp(b) {
                    std::cmp::Ordering::Less => lhs.next(),
                    std::cmp::Ordering::Greater => rhs.next(),
                    std::cmp::Ordering::Equal => {
                        rhs.next();
                        lhs.next()
                    }
                },
            };
            merged.extend(next);
        }
        Self(merged)
    }

    /// weakest to strongest
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.0.iter()
    }
}

impl<S: Ord + Copy> FromIterator<S> for Canon<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut canon = Self::default();
        for strength in iter {
            canon.insert(strength);
        }
        canon
    }
}
