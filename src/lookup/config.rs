use super::error::Error;
use super::error::Result;
use crate::cards::choose;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Everything the builder and the oracle need to know, passed explicitly.
///
/// Defaults come from the crate-level constants. Small `deck` values
/// (the n lowest cards) give synthetic tables that build in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// cards in the deck, taken from the lowest bits
    pub deck: usize,
    /// last phase to build
    pub largest: usize,
    /// capacity multiplier over the expected entry count
    pub load: f64,
    /// lock stripes, a power of two
    pub shards: usize,
    /// combinations per unit of work
    pub chunk: usize,
    /// worker threads, 0 for the rayon default
    pub threads: usize,
    /// artifact location
    pub path: PathBuf,
    /// rebuild when the artifact is unreadable instead of failing
    pub rebuild: bool,
    /// persist after every completed phase
    pub checkpoint: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck: crate::DECK_SIZE,
            largest: crate::LARGEST_HAND,
            load: crate::LOAD_FACTOR,
            shards: (num_cpus::get() * crate::SHARDS_PER_CPU).next_power_of_two(),
            chunk: crate::CHUNK_SIZE,
            threads: 0,
            path: std::env::current_dir()
                .unwrap_or_default()
                .join(crate::TABLE_PATH),
            rebuild: false,
            checkpoint: true,
        }
    }
}

impl Config {
    pub fn with_deck(self, deck: usize) -> Self {
        Self { deck, ..self }
    }
    pub fn with_largest(self, largest: usize) -> Self {
        Self { largest, ..self }
    }
    pub fn with_load(self, load: f64) -> Self {
        Self { load, ..self }
    }
    pub fn with_shards(self, shards: usize) -> Self {
        Self { shards, ..self }
    }
    pub fn with_chunk(self, chunk: usize) -> Self {
        Self { chunk, ..self }
    }
    pub fn with_threads(self, threads: usize) -> Self {
        Self { threads, ..self }
    }
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self
        }
    }
    pub fn with_rebuild(self, rebuild: bool) -> Self {
        Self { rebuild, ..self }
    }
    pub fn with_checkpoint(self, checkpoint: bool) -> Self {
        Self { checkpoint, ..self }
    }

    /// hand sizes covered by the table, in build order
    pub fn sizes(&self) -> RangeInclusive<usize> {
        crate::SMALLEST_HAND..=self.largest
    }
    /// bitmap of the cards in the deck
    pub fn cards(&self) -> u64 {
        (1u64 << self.deck) - 1
    }
    /// C(deck, cards): how many entries a phase must produce
    pub fn entries(&self, cards: usize) -> u64 {
        choose(self.deck, cards).unwrap_or(u64::MAX)
    }
    /// ceil(entries × load) slots for a phase
    pub fn capacity(&self, cards: usize) -> usize {
        (self.entries(cards) as f64 * self.load).ceil() as usize
    }
    /// slots actually allocated for a phase: the capacity split evenly over
    /// the shards, each shard padded against uneven hashing
    pub fn slots(&self, cards: usize) -> usize {
        let shards = self.shards.max(1);
        let each = self.capacity(cards).div_ceil(shards);
        (each + each / 8 + crate::SHARD_SLACK) * shards
    }

    /// Reject anything that would make a build silently wrong.
    pub fn validate(&self) -> Result<()> {
        if !(crate::SMALLEST_HAND..=crate::LARGEST_HAND).contains(&self.largest) {
            return Err(Error::Config(format!(
                "largest hand {} outside {}..={}",
                self.largest,
                crate::SMALLEST_HAND,
                crate::LARGEST_HAND
            )));
        }
        if self.deck > crate::DECK_SIZE || self.deck < self.largest {
            return Err(Error::Config(format!(
                "deck of {} cards cannot deal {}-card hands",
                self.deck, self.largest
            )));
        }
        if !self.load.is_finite() || self.load < crate::MIN_LOAD_FACTOR {
            return Err(Error::Config(format!(
                "load factor {} below {}",
                self.load,
                crate::MIN_LOAD_FACTOR
            )));
        }
        if self.shards == 0 || !self.shards.is_power_of_two() || self.shards > 1 << 16 {
            return Err(Error::Config(format!(
                "shard count {} is not a power of two up to 65536",
                self.shards
            )));
        }
        if self.chunk == 0 {
            return Err(Error::Config("chunk size of zero".into()));
        }
        for cards in self.sizes() {
            let entries = choose(self.deck, cards)
                .ok_or_else(|| Error::Config(format!("C({}, {}) overflows u64", self.deck, cards)))?;
            if entries > crate::MAX_EXACT_COUNT {
                return Err(Error::Config(format!(
                    "{} combinations cannot be reported as exact progress fractions",
                    entries
                )));
            }
            let slots = entries as f64 * self.load;
            if slots >= (usize::MAX / 16) as f64 {
                return Err(Error::Config(format!(
                    "{} slots for {}-card hands overflow the address space",
                    slots, cards
                )));
            }
        }
        Ok(())
    }

    /// the worker pool every phase runs on
    pub fn pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("handtable-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("worker pool: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sizes().collect::<Vec<_>>(), vec![5, 6, 7]);
        assert_eq!(config.entries(7), 133_784_560);
    }

    #[test]
    fn capacity_rounds_up() {
        let config = Config::default().with_deck(10).with_load(1.5);
        assert_eq!(config.entries(5), 252);
        assert_eq!(config.capacity(5), 378);
        let config = config.with_load(1.01);
        assert_eq!(config.capacity(5), 255);
    }

    #[test]
    fn rejects_bad_values() {
        let base = Config::default();
        assert!(base.clone().with_largest(8).validate().is_err());
        assert!(base.clone().with_largest(4).validate().is_err());
        assert!(base.clone().with_deck(53).validate().is_err());
        assert!(base.clone().with_deck(6).validate().is_err());
        assert!(base.clone().with_load(0.5).validate().is_err());
        assert!(base.clone().with_load(1.0).validate().is_err());
        assert!(base.clone().with_load(1.25).validate().is_ok());
        assert!(base.clone().with_load(f64::NAN).validate().is_err());
        assert!(base.clone().with_shards(3).validate().is_err());
        assert!(base.clone().with_chunk(0).validate().is_err());
        assert!(matches!(
            base.with_shards(0).validate(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn shards_are_padded() {
        let config = Config::default().with_deck(20).with_load(1.25).with_shards(8);
        let even = config.capacity(5).div_ceil(8);
        assert_eq!(config.slots(5), (even + even / 8 + crate::SHARD_SLACK) * 8);
        assert!(config.slots(5) > config.capacity(5));
    }

    #[test]
    fn synthetic_deck_is_low_bits() {
        assert_eq!(Config::default().with_deck(8).cards(), 0xFF);
    }
}
