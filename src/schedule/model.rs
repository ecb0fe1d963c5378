use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use serde::Deserialize;

use crate::schedule::ScheduleError;

pub const PRAYER_COUNT: usize = 6;
pub const SENTINEL_TIME: &str = "XX:XX";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Prayer {
    Dawn,
    Sunrise,
    Midday,
    Afternoon,
    Sunset,
    Night,
}

impl Prayer {
    pub const ALL: [Prayer; PRAYER_COUNT] = [
        Prayer::Dawn,
        Prayer::Sunrise,
        Prayer::Midday,
        Prayer::Afternoon,
        Prayer::Sunset,
        Prayer::Night,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PrayerSlot {
    Scheduled(NaiveTime),
    Sentinel,
}

impl PrayerSlot {
    pub fn time(self) -> Option<NaiveTime> {
        match self {
            PrayerSlot::Scheduled(time) => Some(time),
            PrayerSlot::Sentinel => None,
        }
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, PrayerSlot::Sentinel)
    }
}

impl fmt::Display for PrayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrayerSlot::Scheduled(time) => write!(f, "{}", time.format("%H:%M")),
            PrayerSlot::Sentinel => f.write_str(SENTINEL_TIME),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PrayerTimeSet {
    slots: [PrayerSlot; PRAYER_COUNT],
}

impl PrayerTimeSet {
    pub fn new(slots: [PrayerSlot; PRAYER_COUNT]) -> Self {
        Self { slots }
    }

    pub fn sentinel() -> Self {
        Self::new([PrayerSlot::Sentinel; PRAYER_COUNT])
    }

    pub fn from_strings<S: AsRef<str>>(entries: &[S; PRAYER_COUNT]) -> Self {
        let mut slots = [PrayerSlot::Sentinel; PRAYER_COUNT];
        for (slot, (prayer, entry)) in slots.iter_mut().zip(Prayer::ALL.iter().zip(entries)) {
            *slot = match parse_prayer_time(entry.as_ref()) {
                Ok(time) => PrayerSlot::Scheduled(time),
                Err(err) => {
                    if entry.as_ref() != SENTINEL_TIME {
                        log::warn!("{prayer:?} entry replaced by sentinel: {err}");
                    }
                    PrayerSlot::Sentinel
                }
            };
        }
        Self::new(slots)
    }

    pub fn slots(&self) -> &[PrayerSlot; PRAYER_COUNT] {
        &self.slots
    }

    pub fn slot(&self, prayer: Prayer) -> PrayerSlot {
        self.slots[prayer.index()]
    }

    pub fn is_sentinel(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_sentinel())
    }
}

pub fn parse_prayer_time(input: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").map_err(|_| ScheduleError::InvalidTimeFormat {
        input: input.to_string(),
    })
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSet {
    pub prayers: Vec<String>,
    pub prayer_next: String,
    pub prayer_prev: String,
    pub hour1: String,
    pub hour2: String,
    pub hour3: String,
    #[serde(default)]
    pub connection_error: String,
    #[serde(default = "default_time_label_first")]
    pub time_label_first_next: bool,
    #[serde(default = "default_time_label_first")]
    pub time_label_first_prev: bool,
    #[serde(default = "default_minute")]
    pub minute: String,
}

impl LabelSet {
    pub fn bosnian() -> Self {
        Self {
            prayers: to_strings(["Zora", "Izlazak sunca", "Podne", "Ikindija", "Akšam", "Jacija"]),
            prayer_next: "za".to_string(),
            prayer_prev: "prije".to_string(),
            hour1: "sat".to_string(),
            hour2: "sati".to_string(),
            hour3: "sata".to_string(),
            connection_error: "Greška u konekciji".to_string(),
            time_label_first_next: true,
            time_label_first_prev: true,
            minute: default_minute(),
        }
    }

    pub fn english() -> Self {
        Self {
            prayers: to_strings(["Dawn", "Sunrise", "Midday", "Afternoon", "Sunset", "Night"]),
            prayer_next: "in".to_string(),
            prayer_prev: "ago".to_string(),
            hour1: "hour".to_string(),
            hour2: "hours".to_string(),
            hour3: "hours".to_string(),
            connection_error: "Connection error".to_string(),
            time_label_first_next: true,
            time_label_first_prev: false,
            minute: default_minute(),
        }
    }

    pub fn prayer_name(&self, prayer: Prayer) -> &str {
        self.prayers
            .get(prayer.index())
            .map(String::as_str)
            .unwrap_or_default()
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::bosnian()
    }
}

pub fn load_labels(path: &Path) -> Result<LabelSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read label file {}", path.display()))?;
    parse_labels_text(&content)
}

pub fn parse_labels_text(content: &str) -> Result<LabelSet> {
    let labels = serde_json::from_str::<LabelSet>(content).map_err(|err| {
        let line = err.line();
        let column = err.column();
        anyhow::anyhow!("invalid JSON at line {line}, column {column}: {err}")
    })?;

    if labels.prayers.len() != PRAYER_COUNT {
        bail!(
            "label file must name exactly {PRAYER_COUNT} prayers, found {}",
            labels.prayers.len()
        );
    }
    Ok(labels)
}

fn to_strings(names: [&str; PRAYER_COUNT]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn default_time_label_first() -> bool {
    true
}

fn default_minute() -> String {
    "min".to_string()
}
