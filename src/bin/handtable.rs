//! Hand Table Binary
//!
//! Builds, inspects and queries the precomputed hand-rank artifact.
//!
//! Commands: build, inspect, eval

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use handtable::cards::Hand;
use handtable::lookup::Config;
use handtable::lookup::Holdem;
use handtable::lookup::Oracle;
use handtable::lookup::Progress;
use handtable::lookup::Ticker;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
    #[arg(long, global = true, help = "Artifact location")]
    path: Option<PathBuf>,
    #[arg(long, global = true, help = "Largest hand size to cover (5, 6 or 7)")]
    largest: Option<usize>,
    #[arg(long, global = true, help = "Slots per expected entry")]
    load: Option<f64>,
    #[arg(long, global = true, help = "Worker threads, 0 for one per core")]
    threads: Option<usize>,
    #[arg(long, global = true, help = "Rebuild when the artifact is unreadable")]
    rebuild: bool,
    #[arg(long, global = true, help = "Log throughput lines instead of drawing a progress bar")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Build the table and persist it, replacing any artifact")]
    Build,
    #[command(about = "Load or build the table and print its shape as JSON", alias = "info")]
    Inspect,
    #[command(about = "Rank a 5, 6 or 7-card hand, e.g. \"As Ks Qs Js Ts\"", alias = "rank")]
    Eval {
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::default().with_rebuild(self.rebuild);
        if let Some(ref path) = self.path {
            config = config.with_path(path);
        }
        if let Some(largest) = self.largest {
            config = config.with_largest(largest);
        }
        if let Some(load) = self.load {
            config = config.with_load(load);
        }
        if let Some(threads) = self.threads {
            config = config.with_threads(threads);
        }
        config.validate()?;
        Ok(config)
    }
}

fn bar(config: &Config) -> indicatif::ProgressBar {
    let total = config.sizes().map(|k| config.entries(k)).sum();
    let bar = indicatif::ProgressBar::new(total);
    bar.set_style(
        indicatif::ProgressStyle::with_template(
            "{spinner} {elapsed_precise} [{bar:40}] {pos:>11}/{len:11} {per_sec}",
        )
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar()),
    );
    bar
}

fn main() -> anyhow::Result<()> {
    handtable::log();
    let args = Args::parse();
    let config = args.config()?;
    match args.quiet {
        true => run(args.command, config, &Ticker::new()),
        false => {
            let progress = bar(&config);
            let result = run(args.command, config, &progress);
            progress.finish_and_clear();
            result
        }
    }
}

fn run<P: Progress>(command: Command, config: Config, progress: &P) -> anyhow::Result<()> {
    match command {
        Command::Build => {
            let oracle = Oracle::build(config, &Holdem, progress)?;
            log::info!("{:<32}{:<32}", "strength classes", oracle.classes());
        }
        Command::Inspect => {
            let oracle = Oracle::new(config, &Holdem, progress)?;
            println!("{}", serde_json::to_string_pretty(&oracle.summary())?);
        }
        Command::Eval { cards } => {
            let hand = Hand::try_from(cards.join(" ").as_str())
                .map_err(anyhow::Error::msg)
                .context("invalid hand")?;
            let oracle = Oracle::load(config, &Holdem)
                .context("no usable artifact, run `handtable build` first")?;
            println!("{:<24}{}", hand, oracle.rank(hand)?);
        }
    }
    Ok(())
}
