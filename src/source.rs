use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

use crate::schedule::model::{PRAYER_COUNT, PrayerTimeSet};

const ENTRY_KEYS: [&str; PRAYER_COUNT] = ["no1", "no2", "no3", "no4", "no5", "no6"];
const WRAPPER_KEY: &str = "dailyPrayersRes";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid city name '{0}'")]
    InvalidCity(String),
    #[error("unable to read prayer times from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid prayer payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("prayer payload is missing entry '{0}'")]
    MissingEntry(&'static str),
}

pub trait PrayerSource {
    fn fetch_daily_prayer_times(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<PrayerTimeSet, SourceError>;
}

#[derive(Debug, Clone)]
pub struct JsonFilePrayerSource {
    dir: PathBuf,
}

impl JsonFilePrayerSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidate_paths(&self, city: &str, date: NaiveDate) -> [PathBuf; 2] {
        [
            self.dir
                .join(format!("{city}-{}.json", date.format("%Y-%m-%d"))),
            self.dir.join(format!("{city}.json")),
        ]
    }
}

impl PrayerSource for JsonFilePrayerSource {
    fn fetch_daily_prayer_times(
        &self,
        city: &str,
        date: NaiveDate,
    ) -> Result<PrayerTimeSet, SourceError> {
        if city.is_empty() || city.contains(['/', '\\']) || city.starts_with('.') {
            return Err(SourceError::InvalidCity(city.to_string()));
        }

        let [dated, undated] = self.candidate_paths(city, date);
        let path = if dated.is_file() { dated } else { undated };
        let content = read_payload(&path)?;
        parse_daily_prayers(&content)
    }
}

fn read_payload(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_daily_prayers(content: &str) -> Result<PrayerTimeSet, SourceError> {
    let value = serde_json::from_str::<Value>(content)?;
    let daily = value.get(WRAPPER_KEY).unwrap_or(&value);

    let mut entries = [""; PRAYER_COUNT];
    for (entry, key) in entries.iter_mut().zip(ENTRY_KEYS) {
        let raw = daily
            .get(key)
            .and_then(Value::as_str)
            .ok_or(SourceError::MissingEntry(key))?;
        *entry = strip_seconds(raw);
    }
    Ok(PrayerTimeSet::from_strings(&entries))
}

fn strip_seconds(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.match_indices(':').nth(1) {
        Some((second_colon, _)) => &raw[..second_colon],
        None => raw,
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct FetchKey {
    city: String,
    date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct DailyRefresher {
    city: String,
    fetched_for: Option<FetchKey>,
    times: PrayerTimeSet,
    connection_error: bool,
}

impl DailyRefresher {
    pub fn new(city: &str) -> Self {
        Self {
            city: normalize_city(city),
            fetched_for: None,
            times: PrayerTimeSet::sentinel(),
            connection_error: false,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn set_city(&mut self, city: &str) {
        let city = normalize_city(city);
        if city != self.city {
            log::info!("city changed from {} to {}", self.city, city);
            self.city = city;
        }
    }

    pub fn times(&self) -> &PrayerTimeSet {
        &self.times
    }

    pub fn connection_error(&self) -> bool {
        self.connection_error
    }

    pub fn refresh<S>(&mut self, source: &S, today: NaiveDate) -> bool
    where
        S: PrayerSource + ?Sized,
    {
        let key = FetchKey {
            city: self.city.clone(),
            date: today,
        };
        if !self.connection_error && self.fetched_for.as_ref() == Some(&key) {
            return false;
        }

        match source.fetch_daily_prayer_times(&key.city, today) {
            Ok(times) => {
                log::info!("loaded prayer times for {} on {today}", key.city);
                self.times = times;
                self.connection_error = false;
            }
            Err(err) => {
                log::warn!("prayer times for {} unavailable: {err}", key.city);
                self.times = PrayerTimeSet::sentinel();
                self.connection_error = true;
            }
        }
        self.fetched_for = Some(key);
        true
    }
}

fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}
