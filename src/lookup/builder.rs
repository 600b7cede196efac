use super::canon::Canon;
use super::comparator::Comparator;
use super::config::Config;
use super::error::Error;
use super::error::Result;
use super::map::PackedMap;
use super::progress::Progress;
use super::striped::Striped;
use super::table::Table;
use crate::cards::Hand;
use crate::cards::HandIterator;
use rayon::prelude::*;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Runs the table phases on a dedicated worker pool.
///
/// Every phase splits its enumeration into index ranges of `config.chunk`
/// hands and hands them to the pool. A phase returns only once every range
/// is written and the map is frozen, so the next phase always reads a
/// complete, immutable predecessor.
pub struct Builder<'a, C, P> {
    config: &'a Config,
    comparator: &'a C,
    progress: &'a P,
    pool: rayon::ThreadPool,
    done: AtomicU64,
    total: u64,
}

impl<'a, C, P> Builder<'a, C, P>
where
    C: Comparator,
    P: Progress,
{
    pub fn new(config: &'a Config, comparator: &'a C, progress: &'a P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            comparator,
            progress,
            pool: config.pool()?,
            done: AtomicU64::new(0),
            total: config.sizes().map(|k| config.entries(k)).sum(),
        })
    }

    /// Builds every configured phase from scratch.
    pub fn build(&self) -> Result<Table> {
        let mut table = self.five()?;
        while table.largest() < self.config.largest {
            self.phase(&mut table)?;
        }
        Ok(table)
    }

    /// Canonicalizes the five-card space into the first phase of a table.
    pub fn five(&self) -> Result<Table> {
        let cards = crate::SMALLEST_HAND;
        let chunks = self.chunks(cards);
        let canon = self.pool.install(|| {
            chunks
                .par_iter()
                .map(|&(start, len)| {
                    self.hands(cards, start, len)
                        .map(|hand| self.comparator.strength(hand))
                        .collect::<Canon<C::Strength>>()
                })
                .reduce(Canon::default, Canon::merge)
        });
        log::info!("{:<32}{:<32}", "strength classes", canon.len());
        let classes = u32::try_from(canon.len())
            .map_err(|_| Error::Inconsistent(format!("{} classes", canon.len())))?;
        let map = self.fill(cards, &chunks, |hand| {
            canon
                .rank(&self.comparator.strength(hand))
                .ok_or_else(|| Error::Inconsistent(format!("no strength class for {}", hand)))
        })?;
        Ok(Table::new(self.config.deck, classes, map))
    }

    /// Appends the next phase: each hand takes the best rank among the
    /// hands one card smaller.
    pub fn phase(&self, table: &mut Table) -> Result<()> {
        let cards = table.largest() + 1;
        let chunks = self.chunks(cards);
        let prev = table.last();
        let map = self.fill(cards, &chunks, |hand| {
            hand.subhands().try_fold(0, |best, sub| {
                prev.get(u64::from(sub)).map(|r| r.max(best)).map_err(|_| {
                    Error::Inconsistent(format!("subset {} of {} has no rank", sub, hand))
                })
            })
        })?;
        table.push(map);
        Ok(())
    }

    /// Counts phases already present in a resumed table as done.
    pub fn resume(&self, table: &Table) {
        let done = table
            .phases()
            .map(|(cards, _)| self.config.entries(cards))
            .sum::<u64>();
        self.done.store(done, Ordering::Relaxed);
    }

    /// writes `rank(hand)` for every hand of a phase into a fresh map
    fn fill<F>(&self, cards: usize, chunks: &[(u64, usize)], rank: F) -> Result<PackedMap>
    where
        F: Fn(Hand) -> Result<u64> + Sync,
    {
        let striped = Striped::new(self.config.slots(cards), self.config.shards);
        self.pool.install(|| {
            chunks.par_iter().try_for_each(|&(start, len)| {
                let mut batch = striped.batch();
                for hand in self.hands(cards, start, len) {
                    batch.insert(u64::from(hand), rank(hand)?)?;
                }
                batch.flush()?;
                self.tick(len as u64);
                Ok(())
            })
        })?;
        let map = striped.freeze()?;
        let expected = self.config.entries(cards);
        if map.len() as u64 != expected {
            return Err(Error::Inconsistent(format!(
                "{}-card phase holds {} of {} hands",
                cards,
                map.len(),
                expected
            )));
        }
        log::debug!("{:<32}{:<32}", format!("{}-card phase", cards), map.len());
        Ok(map)
    }

    /// (first index, length) for every unit of work in a phase
    fn chunks(&self, cards: usize) -> Vec<(u64, usize)> {
        let total = self.config.entries(cards);
        let chunk = self.config.chunk as u64;
        (0..total.div_ceil(chunk))
            .map(|i| i * chunk)
            .map(|start| (start, (total - start).min(chunk) as usize))
            .collect()
    }

    fn hands(&self, cards: usize, start: u64, len: usize) -> impl Iterator<Item = Hand> {
        HandIterator::resume(cards, self.config.deck, start).take(len)
    }

    fn tick(&self, n: u64) {
        let done = self.done.fetch_add(n, Ordering::Relaxed) + n;
        self.progress
            .report(done as f64 / self.total.max(1) as f64, done);
    }
}
