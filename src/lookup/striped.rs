use super::error::Error;
use super::error::Result;
use super::map::PackedMap;
use super::map::Shard;
use std::sync::Mutex;

/// A [`PackedMap`] under construction: one lock per shard, routed by the
/// same hash the frozen map reads with. Writers go through a [`Batch`] so
/// a lock is taken once per `SHARD_BATCH` pairs rather than per pair.
pub struct Striped {
    shards: Vec<Mutex<Shard>>,
}

impl Striped {
    pub fn new(capacity: usize, shards: usize) -> Self {
        let shards = shards.max(1).next_power_of_two();
        let each = capacity.div_ceil(shards);
        Self {
            shards: (0..shards)
                .map(|_| Mutex::new(Shard::with_capacity(each)))
                .collect(),
        }
    }

    /// a per-worker write buffer
    pub fn batch(&self) -> Batch<'_> {
        Batch {
            into: self,
            pending: vec![Vec::new(); self.shards.len()],
        }
    }

    fn absorb(&self, shard: usize, pairs: &mut Vec<(u64, u64, u64)>) -> Result<()> {
        let mut guard = self.shards[shard]
            .lock()
            .map_err(|_| Error::Inconsistent(format!("shard {} poisoned", shard)))?;
        for (key, hash, value) in pairs.drain(..) {
            guard.insert(key, hash, value)?;
        }
        Ok(())
    }

    /// all writers are done; hand out the read-only map
    pub fn freeze(self) -> Result<PackedMap> {
        self.shards
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                m.into_inner()
                    .map_err(|_| Error::Inconsistent(format!("shard {} poisoned", i)))
            })
            .collect::<Result<Vec<Shard>>>()
            .map(PackedMap::from)
    }
}

/// Buffers (key, value) pairs per shard and flushes full buffers under
/// that shard's lock. Must be [`Batch::flush`]ed before it is dropped.
pub struct Batch<'a> {
    into: &'a Striped,
    pending: Vec<Vec<(u64, u64, u64)>>,
}

impl Batch<'_> {
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        let (shard, hash) = PackedMap::route_among(self.pending.len(), key);
        let buffer = &mut self.pending[shard];
        buffer.push((key, hash, value));
        if buffer.len() >= crate::SHARD_BATCH {
            self.into.absorb(shard, buffer)?;
        }
        Ok(())
    }

    pub fn flush(mut self) -> Result<()> {
        for (shard, buffer) in self.pending.iter_mut().enumerate() {
            if !buffer.is_empty() {
                self.into.absorb(shard, buffer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn parallel_writers_land_everywhere() {
        let striped = Striped::new(40_000, 8);
        (0..8u64)
            .into_par_iter()
            .try_for_each(|w| {
                let mut batch = striped.batch();
                for i in 0..2_500u64 {
                    let key = (w << 32) | (i + 1);
                    batch.insert(key, key ^ 0xFF)?;
                }
                batch.flush()
            })
            .unwrap();
        let map = striped.freeze().unwrap();
        assert_eq!(map.len(), 20_000);
        assert_eq!(map.shards(), 8);
        for w in 0..8u64 {
            for i in 0..2_500u64 {
                let key = (w << 32) | (i + 1);
                assert_eq!(map.get(key).unwrap(), key ^ 0xFF);
            }
        }
    }

    #[test]
    fn odd_shard_count_freezes() {
        let striped = Striped::new(30, 3);
        let mut batch = striped.batch();
        batch.insert(7, 1).unwrap();
        batch.flush().unwrap();
        let map = striped.freeze().unwrap();
        assert_eq!(map.shards(), 4);
        assert_eq!(map.get(7).unwrap(), 1);
    }

    #[test]
    fn unflushed_pairs_are_not_visible() {
        let striped = Striped::new(16, 1);
        let mut batch = striped.batch();
        batch.insert(9, 1).unwrap();
        drop(batch);
        assert!(striped.freeze().unwrap().is_empty());
    }

    #[test]
    fn overflow_surfaces_on_flush() {
        let striped = Striped::new(2, 1);
        let mut batch = striped.batch();
        for key in 1..=3 {
            batch.insert(key, key).unwrap();
        }
        assert!(matches!(batch.flush(), Err(Error::Full { .. })));
    }
}
