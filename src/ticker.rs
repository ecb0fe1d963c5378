use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Timelike};

use crate::render::{PanelView, build_panel};
use crate::schedule::calculator::compute_offsets;
use crate::schedule::model::LabelSet;
use crate::source::{DailyRefresher, PrayerSource};

pub fn run_tick<S, Tz>(
    refresher: &mut DailyRefresher,
    source: &S,
    labels: &LabelSet,
    now: &DateTime<Tz>,
) -> PanelView
where
    S: PrayerSource + ?Sized,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    refresher.refresh(source, now.date_naive());
    let state = compute_offsets(refresher.times(), now);
    log::debug!(
        "tick at {}: current={} offsets={:?}",
        now.format("%H:%M:%S"),
        state.current_index,
        state.offsets
    );
    build_panel(
        refresher.city(),
        now,
        refresher.times(),
        &state,
        labels,
        refresher.connection_error(),
    )
}

pub fn delay_until_next_tick<Tz>(now: &DateTime<Tz>, interval_secs: u64) -> Duration
where
    Tz: TimeZone,
{
    let interval_secs = interval_secs.max(1);
    let into_interval = u64::from(now.num_seconds_from_midnight()) % interval_secs;
    let nanos = u64::from(now.nanosecond().min(999_999_999));
    Duration::from_secs(interval_secs - into_interval).saturating_sub(Duration::from_nanos(nanos))
}
