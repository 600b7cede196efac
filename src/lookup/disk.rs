use super::config::Config;
use super::error::Error;
use super::error::Result;
use super::map::PackedMap;
use super::map::mix;
use super::table::Table;
use crate::cards::choose;
use byteorder::BE;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// for types that are built once, written to disk,
/// and loaded on every later start-up.
pub trait Disk: Sized {
    /// read from disk, trusting nothing
    fn load(config: &Config, print: u64) -> Result<Self>;
    /// write to disk, atomically replacing what was there
    fn save(&self, config: &Config, print: u64) -> Result<()>;
    /// check if file exists on disk
    fn done(config: &Config) -> bool {
        std::fs::metadata(&config.path).is_ok()
    }
    /// file signature, followed by the format version
    fn header() -> &'static [u8] {
        b"HANDRANK\n\xFF\r\n\0"
    }
    /// signals the end of the records
    fn footer() -> u16 {
        0xFFFF
    }
}

/// bumped whenever the layout below changes
pub const VERSION: u16 = 1;

/// Identifies what a table was built from: the format version, the deck,
/// and the strength order. Artifacts with a different print are rejected.
pub fn fingerprint(deck: usize, signature: u64) -> u64 {
    mix(mix(VERSION as u64 ^ signature) ^ deck as u64)
}

/// folds one phase's checksum into the artifact's
fn chain(checksum: u64, cards: u8, phase: u64) -> u64 {
    mix(checksum ^ cards as u64).wrapping_add(phase)
}

impl Disk for Table {
    fn load(config: &Config, print: u64) -> Result<Self> {
        let path = config.path.as_path();
        log::info!("{:<32}{:<32}", "loading     hand ranks", path.display());
        let file = File::open(path).map_err(Error::io(path))?;
        let ref mut reader = BufReader::new(file);
        let ref mut magic = vec![0u8; Self::header().len()];
        reader.read_exact(magic).map_err(Error::io(path))?;
        if magic.as_slice() != Self::header() {
            return Err(Error::Corrupt(format!("{} is not a hand table", path.display())));
        }
        let version = reader.read_u16::<BE>().map_err(Error::io(path))?;
        if version != VERSION {
            return Err(Error::Corrupt(format!("format version {} unsupported", version)));
        }
        let found = reader.read_u64::<BE>().map_err(Error::io(path))?;
        if found != print {
            return Err(Error::Fingerprint {
                expected: print,
                found,
            });
        }
        let deck = reader.read_u8().map_err(Error::io(path))? as usize;
        let largest = reader.read_u8().map_err(Error::io(path))? as usize;
        let classes = reader.read_u32::<BE>().map_err(Error::io(path))?;
        if deck != config.deck {
            return Err(Error::Corrupt(format!("{}-card deck, expected {}", deck, config.deck)));
        }
        if !(crate::SMALLEST_HAND..=crate::LARGEST_HAND).contains(&largest) || classes == 0 {
            return Err(Error::Corrupt(format!(
                "header claims {} phases and {} classes",
                largest, classes
            )));
        }
        let ref mut checksum = 0u64;
        let mut table = None::<Table>;
        for cards in crate::SMALLEST_HAND..=largest {
            let map = read_phase(reader, config, cards, classes, checksum, path)?;
            match table.as_mut() {
                None => table = Some(Table::new(deck, classes, map)),
                Some(table) => table.push(map),
            }
        }
        let footer = reader.read_u16::<BE>().map_err(Error::io(path))?;
        if footer != Self::footer() {
            return Err(Error::Corrupt(format!("footer {:#06x}", footer)));
        }
        let stored = reader.read_u64::<BE>().map_err(Error::io(path))?;
        if stored != *checksum {
            return Err(Error::Corrupt(format!(
                "checksum {:#018x} does not match contents {:#018x}",
                stored, checksum
            )));
        }
        if reader.read(&mut [0u8; 1]).map_err(Error::io(path))? != 0 {
            return Err(Error::Corrupt("trailing bytes after checksum".into()));
        }
        table.ok_or_else(|| Error::Corrupt("no phases".into()))
    }

    fn save(&self, config: &Config, print: u64) -> Result<()> {
        let path = config.path.as_path();
        let temp = path.with_extension("tmp");
        log::info!("{:<32}{:<32}", "saving      hand ranks", path.display());
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(Error::io(dir))?;
        }
        let file = File::create(&temp).map_err(Error::io(&temp))?;
        let ref mut writer = BufWriter::new(file);
        write(self, writer, print).map_err(Error::io(&temp))?;
        writer.flush().map_err(Error::io(&temp))?;
        writer.get_ref().sync_all().map_err(Error::io(&temp))?;
        std::fs::rename(&temp, path).map_err(Error::io(path))?;
        Ok(())
    }
}

fn write<W: Write>(table: &Table, writer: &mut W, print: u64) -> std::io::Result<()> {
    writer.write_all(Table::header())?;
    writer.write_u16::<BE>(VERSION)?;
    writer.write_u64::<BE>(print)?;
    writer.write_u8(table.deck() as u8)?;
    writer.write_u8(table.largest() as u8)?;
    writer.write_u32::<BE>(table.classes())?;
    let mut checksum = 0u64;
    for (cards, map) in table.phases() {
        writer.write_u8(cards as u8)?;
        writer.write_u64::<BE>(map.len() as u64)?;
        checksum = chain(checksum, cards as u8, map.write_to(writer)?);
    }
    writer.write_u16::<BE>(Table::footer())?;
    writer.write_u64::<BE>(checksum)?;
    Ok(())
}

fn read_phase<R: Read>(
    reader: &mut R,
    config: &Config,
    cards: usize,
    classes: u32,
    checksum: &mut u64,
    path: &Path,
) -> Result<PackedMap> {
    let found = reader.read_u8().map_err(Error::io(path))?;
    if found as usize != cards {
        return Err(Error::Corrupt(format!("phase {} where {} expected", found, cards)));
    }
    let count = reader.read_u64::<BE>().map_err(Error::io(path))?;
    let expected = choose(config.deck, cards).unwrap_or(u64::MAX);
    if count != expected {
        return Err(Error::Corrupt(format!(
            "{}-card phase holds {} entries, expected {}",
            cards, count, expected
        )));
    }
    let deck = config.cards();
    let mut map = PackedMap::new(config.slots(cards), config.shards);
    let phase = map
        .read_from(reader, path, count, |key, rank| {
            if key.count_ones() as usize != cards || key & !deck != 0 {
                Err(Error::Corrupt(format!("{:#015x} is not a {}-card hand", key, cards)))
            } else if rank >= classes as u64 {
                Err(Error::Corrupt(format!("rank {} out of {} classes", rank, classes)))
            } else {
                Ok(())
            }
        })?;
    *checksum = chain(*checksum, found, phase);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::Builder;
    use crate::lookup::Holdem;

    fn config(name: &str) -> Config {
        let dir = std::env::temp_dir().join(format!("handtable-disk-{}", std::process::id()));
        Config::default()
            .with_deck(20)
            .with_largest(6)
            .with_load(1.5)
            .with_shards(4)
            .with_chunk(4096)
            .with_path(dir.join(name))
    }

    fn saved(config: &Config) -> Table {
        let table = Builder::new(config, &Holdem, &()).unwrap().build().unwrap();
        table.save(config, fingerprint(config.deck, 7)).unwrap();
        table
    }

    #[test]
    fn round_trip() {
        let config = config("round-trip.bin");
        let table = saved(&config);
        assert!(Table::done(&config));
        let loaded = Table::load(&config, fingerprint(20, 7)).unwrap();
        assert_eq!(loaded.largest(), 6);
        assert_eq!(loaded.classes(), table.classes());
        for (cards, map) in table.phases() {
            let copy = loaded.phase(cards).unwrap();
            assert_eq!(copy.len(), map.len());
            assert!(map.iter().all(|(k, v)| copy.get(k).unwrap() == v));
        }
        assert!(!config.path.with_extension("tmp").exists());
    }

    #[test]
    fn fingerprint_mismatch() {
        let config = config("fingerprint.bin");
        saved(&config);
        assert!(matches!(
            Table::load(&config, fingerprint(20, 8)),
            Err(Error::Fingerprint { .. })
        ));
        assert_ne!(fingerprint(20, 7), fingerprint(24, 7));
    }

    /// the error message from loading `bytes` in place of the artifact
    fn rejected(config: &Config, bytes: &[u8]) -> String {
        std::fs::write(&config.path, bytes).unwrap();
        match Table::load(config, fingerprint(20, 7)) {
            Err(Error::Corrupt(msg)) => msg,
            other => panic!("expected a corrupt artifact, got {:?}", other.map(|t| t.largest())),
        }
    }

    /// byte offset of the first stored rank
    fn first_rank() -> usize {
        // magic, version, print, deck, largest, classes
        let header = Table::header().len() + 2 + 8 + 1 + 1 + 4;
        // phase cards and count, then the first key
        header + 1 + 8 + 8
    }

    #[test]
    fn truncation() {
        let config = config("truncated.bin");
        saved(&config);
        let bytes = std::fs::read(&config.path).unwrap();
        let header = Table::header().len();
        for cut in [4, header + 12, first_rank() + 3, bytes.len() / 2, bytes.len() - 3] {
            let msg = rejected(&config, &bytes[..cut]);
            assert!(msg.ends_with("is truncated"), "cut at {}: {}", cut, msg);
        }
    }

    #[test]
    fn altered_rank_fails_checksum() {
        let config = config("altered.bin");
        let table = saved(&config);
        let mut bytes = std::fs::read(&config.path).unwrap();
        let i = first_rank();
        let rank = u64::from_be_bytes(bytes[i..i + 8].try_into().unwrap());
        let other = (rank + 1) % table.classes() as u64;
        bytes[i..i + 8].copy_from_slice(&other.to_be_bytes());
        assert!(rejected(&config, &bytes).starts_with("checksum"));
    }

    #[test]
    fn rank_out_of_range() {
        let config = config("range.bin");
        let table = saved(&config);
        let mut bytes = std::fs::read(&config.path).unwrap();
        let i = first_rank();
        bytes[i..i + 8].copy_from_slice(&(table.classes() as u64).to_be_bytes());
        assert!(rejected(&config, &bytes).contains("out of"));
    }

    #[test]
    fn trailing_bytes() {
        let config = config("trailing.bin");
        saved(&config);
        let mut bytes = std::fs::read(&config.path).unwrap();
        bytes.push(0);
        assert!(rejected(&config, &bytes).starts_with("trailing bytes"));
    }

    #[test]
    fn bad_magic() {
        let config = config("magic.bin");
        saved(&config);
        let mut bytes = std::fs::read(&config.path).unwrap();
        bytes[0] = b'X';
        assert!(rejected(&config, &bytes).ends_with("is not a hand table"));
    }

    #[test]
    fn missing_file_is_io() {
        let config = config("absent.bin");
        assert!(!Table::done(&config));
        let err = Table::load(&config, 0).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.category(), crate::lookup::Category::Io);
    }
}
