use super::error::Error;
use super::error::Result;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// splitmix64 finalizer. every input bit reaches every output bit,
/// which is all open addressing over card bitmaps needs.
#[inline]
pub fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// maps a uniform hash onto 0..n without division
#[inline]
fn reduce(hash: u64, n: usize) -> usize {
    ((hash as u128 * n as u128) >> 64) as usize
}

/// One open-addressing region: parallel key and value arrays probed
/// linearly. Key 0 marks an empty slot, so the (otherwise valid) key 0
/// lives in its own side slot.
#[derive(Debug, Clone)]
pub struct Shard {
    keys: Box<[u64]>,
    vals: Box<[u64]>,
    zero: Option<u64>,
    len: usize,
}

impl Shard {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            keys: vec![0; capacity].into_boxed_slice(),
            vals: vec![0; capacity].into_boxed_slice(),
            zero: None,
            len: 0,
        }
    }
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    pub fn insert(&mut self, key: u64, hash: u64, value: u64) -> Result<()> {
        if key == 0 {
            self.len += self.zero.is_none() as usize;
            self.zero = Some(value);
            return Ok(());
        }
        let n = self.keys.len();
        let mut i = reduce(hash, n);
        for _ in 0..n {
            match self.keys[i] {
                0 => {
                    self.keys[i] = key;
                    self.vals[i] = value;
                    self.len += 1;
                    return Ok(());
                }
                k if k == key => {
                    self.vals[i] = value;
                    return Ok(());
                }
                _ => i = if i + 1 == n { 0 } else { i + 1 },
            }
        }
        Err(Error::Full { capacity: n })
    }

    #[inline]
    pub fn get(&self, key: u64, hash: u64) -> Option<u64> {
        if key == 0 {
            return self.zero;
        }
        let n = self.keys.len();
        let mut i = reduce(hash, n);
        for _ in 0..n {
            match self.keys[i] {
                0 => return None,
                k if k == key => return Some(self.vals[i]),
                _ => i = if i + 1 == n { 0 } else { i + 1 },
            }
        }
        None
    }

    /// the longest run of slots any stored key had to walk
    fn longest_probe(&self, map: &PackedMap) -> usize {
        let n = self.keys.len();
        self.keys
            .iter()
            .enumerate()
            .filter(|(_, k)| **k != 0)
            .map(|(i, k)| {
                let home = reduce(map.route(*k).1, n);
                (i + n - home) % n + 1
            })
            .max()
            .unwrap_or(0)
    }

    fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.zero.map(|v| (0, v)).into_iter().chain(
            self.keys
                .iter()
                .zip(self.vals.iter())
                .filter(|(k, _)| **k != 0)
                .map(|(k, v)| (*k, *v)),
        )
    }
}

/// Fixed-capacity map from 64-bit card bitmaps to 64-bit ordinals.
///
/// The map is split into a power-of-two number of shards. A key's hash
/// picks the shard from its high bits and the home slot from the rest,
/// so the same routing serves concurrent writers (one lock per shard,
/// see [`Striped`]) and lock-free readers once the map is frozen.
///
/// [`Striped`]: super::striped::Striped
#[derive(Debug, Clone)]
pub struct PackedMap {
    shards: Box<[Shard]>,
}

impl PackedMap {
    /// at least `capacity` slots spread over `shards` regions,
    /// rounded up to a power of two
    pub fn new(capacity: usize, shards: usize) -> Self {
        let shards = shards.max(1).next_power_of_two();
        let each = capacity.div_ceil(shards);
        Self::from(
            (0..shards)
                .map(|_| Shard::with_capacity(each))
                .collect::<Vec<Shard>>(),
        )
    }

    /// (shard index, in-shard hash) for a key
    #[inline]
    pub fn route(&self, key: u64) -> (usize, u64) {
        Self::route_among(self.shards.len(), key)
    }
    #[inline]
    pub(crate) fn route_among(shards: usize, key: u64) -> (usize, u64) {
        let hash = mix(key);
        (reduce(hash, shards), hash.rotate_left(32))
    }

    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        let (shard, hash) = self.route(key);
        self.shards[shard].insert(key, hash, value)
    }

    #[inline]
    pub fn get(&self, key: u64) -> Result<u64> {
        let (shard, hash) = self.route(key);
        self.shards[shard].get(key, hash).ok_or(Error::Missing(key))
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn capacity(&self) -> usize {
        self.shards.iter().map(Shard::capacity).sum()
    }
    pub fn shards(&self) -> usize {
        self.shards.len()
    }
    pub fn longest_probe(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.longest_probe(self))
            .max()
            .unwrap_or(0)
    }

    /// every (key, value) pair, shard by shard
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.shards.iter().flat_map(Shard::iter)
    }

    /// Streams every entry as big-endian (key, value) pairs.
    /// Returns a checksum over the stream, in stream order.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<u64> {
        let mut checksum = 0u64;
        for (key, value) in self.iter() {
            writer.write_u64::<BE>(key)?;
            writer.write_u64::<BE>(value)?;
            checksum = fold(checksum, key, value);
        }
        Ok(checksum)
    }

    /// Inverse of [`PackedMap::write_to`]: reads `count` pairs from `origin`
    /// into `self`, passing each through `check` first. Returns the stream
    /// checksum.
    pub fn read_from<R, F>(
        &mut self,
        reader: &mut R,
        origin: &Path,
        count: u64,
        check: F,
    ) -> Result<u64>
    where
        R: Read,
        F: Fn(u64, u64) -> Result<()>,
    {
        let mut checksum = 0u64;
        for _ in 0..count {
            let key = reader.read_u64::<BE>().map_err(Error::io(origin))?;
            let value = reader.read_u64::<BE>().map_err(Error::io(origin))?;
            check(key, value)?;
            self.insert(key, value)?;
            checksum = fold(checksum, key, value);
        }
        if self.len() as u64 != count {
            return Err(Error::Corrupt(format!(
                "{} entries declared, {} distinct keys read",
                count,
                self.len()
            )));
        }
        Ok(checksum)
    }
}

/// running checksum over a stream of pairs
pub fn fold(checksum: u64, key: u64, value: u64) -> u64 {
    mix(checksum ^ key).wrapping_add(mix(value))
}

impl From<Vec<Shard>> for PackedMap {
    fn from(shards: Vec<Shard>) -> Self {
        assert!(shards.len().is_power_of_two());
        Self {
            shards: shards.into_boxed_slice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::HandIterator;

    #[test]
    fn insert_then_get() {
        let mut map = PackedMap::new(64, 4);
        map.insert(0b11111, 7).unwrap();
        map.insert(0b111110, 9).unwrap();
        assert_eq!(map.get(0b11111).unwrap(), 7);
        assert_eq!(map.get(0b111110).unwrap(), 9);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn overwrite_keeps_one_entry() {
        let mut map = PackedMap::new(16, 1);
        map.insert(42, 1).unwrap();
        map.insert(42, 2).unwrap();
        assert_eq!(map.get(42).unwrap(), 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn missing_key() {
        let map = PackedMap::new(16, 2);
        assert!(matches!(map.get(0b1011), Err(Error::Missing(0b1011))));
    }

    #[test]
    fn zero_is_a_key() {
        let mut map = PackedMap::new(4, 1);
        assert!(map.get(0).is_err());
        map.insert(0, 3).unwrap();
        map.insert(0, 4).unwrap();
        assert_eq!(map.get(0).unwrap(), 4);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn full_shard_is_an_error() {
        let mut map = PackedMap::new(3, 1);
        for key in 1..=3 {
            map.insert(key, key).unwrap();
        }
        assert!(matches!(map.insert(4, 4), Err(Error::Full { capacity: 3 })));
        // still readable when every slot is taken
        assert_eq!(map.get(2).unwrap(), 2);
        assert!(map.get(5).is_err());
    }

    #[test]
    fn capacity_covers_request() {
        let map = PackedMap::new(1000, 8);
        assert!(map.capacity() >= 1000);
        assert_eq!(map.shards(), 8);
        assert!(map.is_empty());
    }

    #[test]
    fn shard_count_rounds_up() {
        let mut map = PackedMap::new(100, 3);
        assert_eq!(map.shards(), 4);
        assert!(map.capacity() >= 100);
        map.insert(0b11111, 1).unwrap();
        assert_eq!(map.get(0b11111).unwrap(), 1);
    }

    #[test]
    fn every_hand_of_a_small_deck() {
        let hands = HandIterator::within(5, 24).map(u64::from).collect::<Vec<u64>>();
        let mut map = PackedMap::new(hands.len() * 2, 16);
        for (i, key) in hands.iter().enumerate() {
            map.insert(*key, i as u64).unwrap();
        }
        assert_eq!(map.len(), hands.len());
        for (i, key) in hands.iter().enumerate() {
            assert_eq!(map.get(*key).unwrap(), i as u64);
        }
        // a well-mixed hash keeps probe runs short even at load 0.5
        assert!(map.longest_probe() < 64);
    }

    #[test]
    fn stream_round_trip() {
        let mut map = PackedMap::new(100, 4);
        for key in HandIterator::within(3, 9).map(u64::from) {
            map.insert(key, key.count_ones() as u64 + key % 5).unwrap();
        }
        let mut bytes = Vec::new();
        let written = map.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), map.len() * 16);
        let mut copy = PackedMap::new(200, 2);
        let read = copy
            .read_from(&mut bytes.as_slice(), Path::new("t"), map.len() as u64, |_, _| Ok(()))
            .unwrap();
        assert_eq!(written, read);
        assert!(map.iter().all(|(k, v)| copy.get(k).unwrap() == v));
    }

    #[test]
    fn short_stream_is_corrupt() {
        let mut map = PackedMap::new(8, 1);
        map.insert(5, 1).unwrap();
        let mut bytes = Vec::new();
        map.write_to(&mut bytes).unwrap();
        bytes.truncate(12);
        let mut copy = PackedMap::new(8, 1);
        assert!(matches!(
            copy.read_from(&mut bytes.as_slice(), Path::new("t"), 1, |_, _| Ok(())),
            Err(Error::Corrupt(_))
        ));
    }
}
