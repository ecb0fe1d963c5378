mod render;
mod schedule;
mod settings;
mod source;
mod ticker;

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone};
use clap::{Parser, ValueEnum};

use crate::render::PanelView;
use crate::schedule::model::{LabelSet, load_labels};
use crate::settings::load_settings;
use crate::source::{DailyRefresher, JsonFilePrayerSource};
use crate::ticker::{delay_until_next_tick, run_tick};

const DEFAULT_LABELS_PATH: &str = "translations/labels.json";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliLanguage {
    Bosnian,
    English,
}

impl CliLanguage {
    fn labels(self) -> LabelSet {
        match self {
            CliLanguage::Bosnian => LabelSet::bosnian(),
            CliLanguage::English => LabelSet::english(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "vaktija",
    version,
    about = "Daily prayer times with countdown to the next prayer"
)]
struct Cli {
    #[arg(long, default_value = "graz")]
    city: String,

    /// JSON settings file (`{"city": ...}`) re-read every tick; overrides --city
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Directory holding `<city>.json` or `<city>-<YYYY-MM-DD>.json` files
    #[arg(long, default_value = "prayers")]
    data_dir: PathBuf,

    /// JSON label file; defaults to translations/labels.json unless --language is given
    #[arg(long)]
    labels: Option<PathBuf>,

    #[arg(long, value_enum)]
    language: Option<CliLanguage>,

    /// Pin the clock to a local time (YYYY-MM-DDTHH:MM[:SS]) and run a single tick
    #[arg(long, value_parser = parse_local_datetime)]
    now: Option<NaiveDateTime>,

    #[arg(long)]
    once: bool,

    #[arg(long)]
    json: bool,

    #[arg(long, default_value_t = 60)]
    interval_secs: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.interval_secs == 0 {
        bail!("--interval-secs must be greater than zero");
    }

    let labels = resolve_labels(cli.labels.as_deref(), cli.language)?;
    let source = JsonFilePrayerSource::new(&cli.data_dir);
    let mut refresher = DailyRefresher::new(&cli.city);
    if let Some(path) = &cli.settings {
        let settings =
            load_settings(path).with_context(|| format!("failed to load {}", path.display()))?;
        refresher.set_city(&settings.city);
    }

    if let Some(pinned) = cli.now {
        let now = resolve_local(pinned)?;
        let panel = run_tick(&mut refresher, &source, &labels, &now);
        return print_panel(&panel, cli.json);
    }

    loop {
        if let Some(path) = &cli.settings {
            reload_settings(path, &mut refresher);
        }
        let now = Local::now();
        let panel = run_tick(&mut refresher, &source, &labels, &now);
        print_panel(&panel, cli.json)?;
        if cli.once {
            return Ok(());
        }
        thread::sleep(delay_until_next_tick(&now, cli.interval_secs));
    }
}

fn resolve_labels(path: Option<&Path>, language: Option<CliLanguage>) -> Result<LabelSet> {
    if let Some(path) = path {
        return load_labels(path).with_context(|| format!("failed to load {}", path.display()));
    }
    if let Some(language) = language {
        return Ok(language.labels());
    }

    match load_labels(Path::new(DEFAULT_LABELS_PATH)) {
        Ok(labels) => Ok(labels),
        Err(err) => {
            log::warn!("using built-in labels: {err:#}");
            Ok(LabelSet::default())
        }
    }
}

fn reload_settings(path: &Path, refresher: &mut DailyRefresher) {
    match load_settings(path) {
        Ok(settings) => refresher.set_city(&settings.city),
        Err(err) => log::warn!("keeping city {}: {err:#}", refresher.city()),
    }
}

fn print_panel(panel: &PanelView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(panel)?);
    } else {
        print!("{panel}");
    }
    Ok(())
}

fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|_| format!("invalid local datetime '{input}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

fn resolve_local(naive: NaiveDateTime) -> Result<DateTime<Local>> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(first, _second) => Ok(first),
        LocalResult::None => Err(anyhow!("local time {naive} does not exist in this time zone")),
    }
}
