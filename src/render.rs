use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::schedule::calculator::{ScheduleState, format_offset_phrase};
use crate::schedule::model::{LabelSet, PRAYER_COUNT, Prayer, PrayerTimeSet};

const NAME_WIDTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub title: String,
    pub date: String,
    pub city: String,
    pub connection_error: bool,
    // Raw index; stays 0 when no slot is at or before now or slot 0 is missing.
    pub current_index: usize,
    pub current_available: bool,
    pub offsets: [f64; PRAYER_COUNT],
    pub rows: Vec<PrayerRow>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct PrayerRow {
    pub name: String,
    pub time: String,
    pub phrase: String,
    pub current: bool,
}

pub fn build_panel<Tz>(
    city: &str,
    now: &DateTime<Tz>,
    times: &PrayerTimeSet,
    state: &ScheduleState,
    labels: &LabelSet,
    connection_error: bool,
) -> PanelView
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let connection_error = connection_error || times.is_sentinel();
    let title = if connection_error {
        labels.connection_error.clone()
    } else {
        format!("Vaktija - {} | {}", capitalize(city), now.format("%H:%M"))
    };

    let rows = Prayer::ALL
        .iter()
        .map(|prayer| {
            let index = prayer.index();
            PrayerRow {
                name: labels.prayer_name(*prayer).to_string(),
                time: times.slot(*prayer).to_string(),
                phrase: format_offset_phrase(state.offsets[index], labels),
                current: state.is_current(index),
            }
        })
        .collect();

    PanelView {
        title,
        date: now.format("%a, %b %d").to_string().to_uppercase(),
        city: city.to_string(),
        connection_error,
        current_index: state.current_index,
        current_available: state.is_current(state.current_index),
        offsets: state.offsets,
        rows,
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule_width = self
            .title
            .chars()
            .count()
            .max(NAME_WIDTH + 8)
            .max(self.date.chars().count());
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.date)?;
        writeln!(f, "{}", "-".repeat(rule_width))?;
        for row in &self.rows {
            let marker = if row.current { '>' } else { ' ' };
            writeln!(
                f,
                "{marker} {:<width$} {}",
                row.name,
                row.time,
                width = NAME_WIDTH
            )?;
            writeln!(f, "    {}", row.phrase)?;
        }
        Ok(())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
