//! Precomputed poker hand ranks.
//!
//! Every 5, 6 and 7-card combination of a 52-card deck is mapped to a dense
//! ordinal rank that is consistent with the standard poker total order:
//! stronger hands rank strictly higher, equally strong hands rank equally.
//! The table is built once (or loaded from disk) and then queried in O(1).
//!
//! ## Modules
//!
//! - [`cards`]: bitmap hands, the combination enumerator, and the bitwise
//!   strength evaluator that the table is derived from
//! - [`lookup`]: the packed hash map, the phased table builder, the
//!   on-disk artifact, and the [`lookup::Oracle`] query façade
pub mod cards;
pub mod lookup;

// ============================================================================
// DECK
// ============================================================================
/// Cards in a full deck.
pub const DECK_SIZE: usize = 52;
/// Smallest hand the table covers (the canonicalized phase).
pub const SMALLEST_HAND: usize = 5;
/// Largest hand the table covers.
pub const LARGEST_HAND: usize = 7;

// ============================================================================
// PACKED HASH MAP
// Capacity per phase = ceil(entries × LOAD_FACTOR). Larger trades memory for
// shorter probe sequences.
// ============================================================================
/// Capacity multiplier over the expected entry count.
pub const LOAD_FACTOR: f64 = 6.0;
/// Smallest accepted load factor. Keys never split perfectly evenly over
/// shards, so a tighter table would overflow some shard mid-build.
pub const MIN_LOAD_FACTOR: f64 = 1.25;
/// Extra slots per shard on top of an eighth of its even share.
pub const SHARD_SLACK: usize = 16;
/// Lock stripes per CPU while a phase is being written.
pub const SHARDS_PER_CPU: usize = 4;
/// Pairs buffered per shard by a worker before taking the shard lock.
pub const SHARD_BATCH: usize = 1024;

// ============================================================================
// TABLE CONSTRUCTION
// ============================================================================
/// Combinations handed to a worker as one unit of work.
pub const CHUNK_SIZE: usize = 1 << 16;
/// Progress values are reported as f64 fractions; counts above this lose precision.
pub const MAX_EXACT_COUNT: u64 = 1 << f64::MANTISSA_DIGITS;
/// Default artifact location, relative to the working directory.
pub const TABLE_PATH: &str = "tables/handranks.bin";
/// Interval between throughput log lines while building.
pub const PROGRESS_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "native")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
