use super::builder::Builder;
use super::comparator::Comparator;
use super::config::Config;
use super::disk::Disk;
use super::disk::fingerprint;
use super::error::Category;
use super::error::Error;
use super::error::Result;
use super::progress::Progress;
use super::summary::Summary;
use super::table::Table;
use crate::cards::Hand;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::time::Duration;
use std::time::Instant;

static ORACLE: OnceLock<Oracle> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// Where an [`Oracle`] is in its life. Only `Ready` oracles are ever
/// handed out; the other states exist for the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Loading,
    Building(usize),
    Persisting,
    Ready,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            State::Uninitialized => write!(f, "uninitialized"),
            State::Loading => write!(f, "loading"),
            State::Building(cards) => write!(f, "building {}-card hands", cards),
            State::Persisting => write!(f, "persisting"),
            State::Ready => write!(f, "ready"),
        }
    }
}

/// Answers "how strong is this hand" for every 5, 6 and 7-card hand.
///
/// Construction either loads the artifact at `config.path` or builds the
/// table phase by phase and persists it. Once constructed the oracle is
/// immutable, so any number of threads may query it without locking.
///
/// ```no_run
/// use handtable::cards::Hand;
/// use handtable::lookup::{Config, Holdem, Oracle};
///
/// let oracle = Oracle::new(Config::default(), &Holdem, &()).unwrap();
/// let hand = Hand::try_from("As Ks Qs Js Ts 2c 2d").unwrap();
/// assert_eq!(oracle.rank(hand).unwrap(), oracle.classes() as u64 - 1);
/// ```
pub struct Oracle {
    config: Config,
    table: Table,
    cards: u64,
}

impl Oracle {
    /// Load the artifact if there is one, resuming a partial build from
    /// its last completed phase, or build from scratch.
    pub fn new<C, P>(config: Config, comparator: &C, progress: &P) -> Result<Self>
    where
        C: Comparator,
        P: Progress,
    {
        config.validate()?;
        let begin = Instant::now();
        let print = fingerprint(config.deck, comparator.signature());
        let prior = match Table::done(&config) {
            false => None,
            true => {
                Self::enter(State::Loading);
                match Table::load(&config, print) {
                    Ok(table) => Some(table),
                    Err(e) if config.rebuild && e.category() == Category::Io => {
                        log::warn!("{:<32}{}", "discarding  artifact", e);
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };
        let table = match prior {
            Some(table) if table.largest() >= config.largest => table,
            prior => Self::grow(&config, comparator, progress, print, prior)?,
        };
        Ok(Self::ready(config, table, begin))
    }

    /// Build from scratch, replacing any artifact.
    pub fn build<C, P>(config: Config, comparator: &C, progress: &P) -> Result<Self>
    where
        C: Comparator,
        P: Progress,
    {
        config.validate()?;
        let begin = Instant::now();
        let print = fingerprint(config.deck, comparator.signature());
        let table = Self::grow(&config, comparator, progress, print, None)?;
        Ok(Self::ready(config, table, begin))
    }

    /// Load a complete artifact. Never builds.
    pub fn load<C>(config: Config, comparator: &C) -> Result<Self>
    where
        C: Comparator,
    {
        config.validate()?;
        let begin = Instant::now();
        Self::enter(State::Loading);
        let table = Table::load(&config, fingerprint(config.deck, comparator.signature()))?;
        if table.largest() < config.largest {
            return Err(Error::Corrupt(format!(
                "artifact holds hands up to {} cards, {} configured",
                table.largest(),
                config.largest
            )));
        }
        Ok(Self::ready(config, table, begin))
    }

    /// The process-wide oracle, constructed by the first caller.
    /// Later calls return the same instance whatever they pass.
    pub fn init<C, P>(config: Config, comparator: &C, progress: &P) -> Result<&'static Self>
    where
        C: Comparator,
        P: Progress,
    {
        let _guard = INIT
            .lock()
            .map_err(|_| Error::Inconsistent("oracle initialization panicked".into()))?;
        if let Some(oracle) = ORACLE.get() {
            if oracle.config != config {
                log::warn!("{:<32}{}", "oracle      already ready", oracle.config.path.display());
            }
            return Ok(oracle);
        }
        let oracle = Self::new(config, comparator, progress)?;
        Ok(ORACLE.get_or_init(|| oracle))
    }

    /// The process-wide oracle, if [`Oracle::init`] has completed.
    pub fn get() -> Result<&'static Self> {
        ORACLE.get().ok_or(Error::NotReady)
    }

    /// Rank of a card bitmap. Higher is stronger; equal is a tie.
    #[inline]
    pub fn evaluate(&self, hand: u64) -> Result<u64> {
        let cards = hand.count_ones();
        if hand & !self.cards != 0 || !self.config.sizes().contains(&(cards as usize)) {
            return Err(Error::Unsupported { hand, cards });
        }
        self.table.get(hand)
    }

    pub fn rank(&self, hand: Hand) -> Result<u64> {
        self.evaluate(u64::from(hand))
    }

    /// distinct strengths among five-card hands
    pub fn classes(&self) -> u32 {
        self.table.classes()
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn summary(&self) -> Summary {
        Summary::from(&self.table)
    }

    fn grow<C, P>(
        config: &Config,
        comparator: &C,
        progress: &P,
        print: u64,
        prior: Option<Table>,
    ) -> Result<Table>
    where
        C: Comparator,
        P: Progress,
    {
        let builder = Builder::new(config, comparator, progress)?;
        let mut table = match prior {
            Some(table) => {
                log::info!("{:<32}{:<32}", "resuming    after phase", table.largest());
                builder.resume(&table);
                table
            }
            None => {
                Self::enter(State::Building(crate::SMALLEST_HAND));
                let table = builder.five()?;
                Self::checkpoint(config, &table, print)?;
                table
            }
        };
        while table.largest() < config.largest {
            Self::enter(State::Building(table.largest() + 1));
            builder.phase(&mut table)?;
            Self::checkpoint(config, &table, print)?;
        }
        Self::enter(State::Persisting);
        table.save(config, print)?;
        Ok(table)
    }

    /// persist an intermediate table so an interrupted build can resume
    fn checkpoint(config: &Config, table: &Table, print: u64) -> Result<()> {
        if config.checkpoint && table.largest() < config.largest {
            log::debug!("{:<32}{:<32}", "checkpoint  after phase", table.largest());
            table.save(config, print)?;
        }
        Ok(())
    }

    fn ready(config: Config, table: Table, begin: Instant) -> Self {
        Self::enter(State::Ready);
        log::info!("{:<32}{:<32}", "hand ranks  ready in", elapsed(begin.elapsed()));
        Self {
            cards: config.cards(),
            config,
            table,
        }
    }

    fn enter(state: State) {
        log::info!("{:<32}{:<32}", "hand ranks  state", state);
    }
}

/// "{d}d {h}h {m}m {s}s"
fn elapsed(duration: Duration) -> String {
    let s = duration.as_secs();
    format!(
        "{}d {}h {}m {}s",
        s / 86_400,
        s / 3_600 % 24,
        s / 60 % 60,
        s % 60
    )
}
