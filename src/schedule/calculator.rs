use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone};

use crate::schedule::model::{LabelSet, PRAYER_COUNT, PrayerTimeSet};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState {
    pub current_index: usize,
    pub offsets: [f64; PRAYER_COUNT],
    available: [bool; PRAYER_COUNT],
}

impl ScheduleState {
    pub fn is_current(&self, index: usize) -> bool {
        index == self.current_index && self.available.get(index).copied().unwrap_or(false)
    }
}

pub fn compute_offsets<Tz>(times: &PrayerTimeSet, now: &DateTime<Tz>) -> ScheduleState
where
    Tz: TimeZone,
{
    let timezone = now.timezone();
    let day = now.date_naive();

    let mut state = ScheduleState {
        current_index: 0,
        offsets: [0.0; PRAYER_COUNT],
        available: [false; PRAYER_COUNT],
    };

    for (index, slot) in times.slots().iter().enumerate() {
        let Some(time) = slot.time() else {
            continue;
        };
        // Nonexistent local times (DST gap) count as unavailable.
        let Some(at) = resolve_local_datetime(&timezone, day.and_time(time)) else {
            log::debug!("prayer slot {index} at {time} does not exist on {day}");
            continue;
        };

        state.available[index] = true;
        if at <= *now {
            state.current_index = index;
        }
        state.offsets[index] =
            at.signed_duration_since(now).num_milliseconds() as f64 / MILLIS_PER_HOUR;
    }

    state
}

pub fn format_offset_phrase(offset_hours: f64, labels: &LabelSet) -> String {
    let direction = if offset_hours > 0.0 {
        &labels.prayer_next
    } else {
        &labels.prayer_prev
    };

    let abs_hours = offset_hours.abs();
    let (count, unit) = if abs_hours < 1.0 {
        ((abs_hours * 60.0).round() as u64, labels.minute.as_str())
    } else {
        let hours = abs_hours.round() as u64;
        (hours, hour_unit(hours, labels))
    };

    let time_label_first = if *direction == labels.prayer_next {
        labels.time_label_first_next
    } else {
        labels.time_label_first_prev
    };

    if time_label_first {
        format!("{direction} {count} {unit}")
    } else {
        format!("{count} {unit} {direction}")
    }
}

fn hour_unit(count: u64, labels: &LabelSet) -> &str {
    match count {
        5..=20 => &labels.hour2,
        1 => &labels.hour1,
        21 if labels.hour2 != labels.hour3 => &labels.hour1,
        _ => &labels.hour3,
    }
}

fn resolve_local_datetime<Tz>(timezone: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
{
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _second) => Some(first),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, Utc};
    use chrono_tz::Europe::Vienna;

    use super::*;
    use crate::schedule::model::{PrayerSlot, SENTINEL_TIME};

    fn graz_day() -> PrayerTimeSet {
        PrayerTimeSet::from_strings(&["03:45", "05:30", "12:40", "16:10", "19:50", "21:20"])
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, hour, minute, 0)
            .single()
            .expect("valid instant")
    }

    fn labels_with_order(first_next: bool, first_prev: bool) -> LabelSet {
        LabelSet {
            time_label_first_next: first_next,
            time_label_first_prev: first_prev,
            ..LabelSet::english()
        }
    }

    #[test]
    fn afternoon_is_current_between_asr_and_maghrib() {
        let state = compute_offsets(&graz_day(), &at(17, 0));
        assert_eq!(state.current_index, 3);
        assert!(state.is_current(3));
        assert!((state.offsets[4] - 17.0 / 6.0).abs() < 1e-9);
        assert!((state.offsets[3] + 50.0 / 60.0).abs() < 1e-9);
        assert_eq!(
            format_offset_phrase(state.offsets[4], &LabelSet::english()),
            "in 3 hours"
        );
    }

    #[test]
    fn current_index_is_last_prayer_at_or_before_now() {
        let times = graz_day();
        let cases = [
            ((0, 30), 0),
            ((3, 44), 0),
            ((3, 45), 0),
            ((5, 30), 1),
            ((12, 39), 1),
            ((12, 40), 2),
            ((19, 49), 3),
            ((21, 19), 4),
            ((21, 20), 5),
            ((23, 59), 5),
        ];
        for ((hour, minute), expected) in cases {
            let state = compute_offsets(&times, &at(hour, minute));
            assert_eq!(state.current_index, expected, "at {hour:02}:{minute:02}");
        }
    }

    #[test]
    fn offset_sign_follows_prayer_order() {
        let now = at(13, 0);
        let state = compute_offsets(&graz_day(), &now);
        for (index, slot) in graz_day().slots().iter().enumerate() {
            let time = slot.time().expect("scheduled");
            assert_eq!(state.offsets[index] > 0.0, time > now.time(), "slot {index}");
        }
    }

    #[test]
    fn repeated_computation_is_identical() {
        let now = at(8, 15);
        let first = compute_offsets(&graz_day(), &now);
        let second = compute_offsets(&graz_day(), &now);
        assert_eq!(first, second);
    }

    #[test]
    fn sentinel_slots_never_become_current() {
        let times = PrayerTimeSet::from_strings(&[
            "03:45",
            "05:30",
            "12:40",
            "16:10",
            SENTINEL_TIME,
            "21:20",
        ]);
        let state = compute_offsets(&times, &at(20, 0));
        assert_eq!(state.current_index, 3);
        assert_eq!(state.offsets[4], 0.0);
        assert!(!state.available[4]);

        let all_missing = compute_offsets(&PrayerTimeSet::sentinel(), &at(12, 0));
        assert_eq!(all_missing.current_index, 0);
        assert!(!all_missing.is_current(0));
        assert!(all_missing.offsets.iter().all(|offset| *offset == 0.0));
    }

    #[test]
    fn offsets_use_the_zone_of_now() {
        let plus_two = FixedOffset::east_opt(2 * 3600).expect("offset");
        let now = plus_two
            .with_ymd_and_hms(2026, 10, 18, 17, 0, 0)
            .single()
            .expect("valid");
        let state = compute_offsets(&graz_day(), &now);
        assert_eq!(state.current_index, 3);
        assert!((state.offsets[5] - 4.0 - 20.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn dst_gap_slot_is_treated_as_missing() {
        let times = PrayerTimeSet::new([
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(2, 30, 0).expect("time")),
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(6, 0, 0).expect("time")),
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(12, 0, 0).expect("time")),
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(15, 0, 0).expect("time")),
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(19, 0, 0).expect("time")),
            PrayerSlot::Scheduled(chrono::NaiveTime::from_hms_opt(20, 30, 0).expect("time")),
        ]);
        let now = Vienna
            .with_ymd_and_hms(2026, 3, 29, 7, 0, 0)
            .single()
            .expect("valid");
        let state = compute_offsets(&times, &now);
        assert!(!state.available[0]);
        assert_eq!(state.offsets[0], 0.0);
        assert_eq!(state.current_index, 1);
        assert!((state.offsets[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn minutes_phrase_respects_next_order_flag() {
        let first = LabelSet {
            prayer_next: "in".to_string(),
            ..labels_with_order(true, true)
        };
        assert_eq!(format_offset_phrase(0.5, &first), "in 30 min");

        let last = labels_with_order(false, true);
        assert_eq!(format_offset_phrase(0.5, &last), "30 min in");
    }

    #[test]
    fn previous_phrase_uses_its_own_order_flag() {
        let labels = labels_with_order(true, false);
        assert_eq!(format_offset_phrase(-0.25, &labels), "15 min ago");
        assert_eq!(format_offset_phrase(-2.2, &labels), "2 hours ago");

        let leading = labels_with_order(false, true);
        assert_eq!(format_offset_phrase(-0.25, &leading), "ago 15 min");
    }

    #[test]
    fn zero_offset_counts_as_previous() {
        let labels = LabelSet::bosnian();
        assert_eq!(format_offset_phrase(0.0, &labels), "prije 0 min");
        assert_eq!(format_offset_phrase(-0.0, &labels), "prije 0 min");
    }

    #[test]
    fn hour_units_follow_plural_rules() {
        let labels = LabelSet::bosnian();
        assert_eq!(format_offset_phrase(1.2, &labels), "za 1 sat");
        assert_eq!(format_offset_phrase(3.0, &labels), "za 3 sata");
        assert_eq!(format_offset_phrase(7.0, &labels), "za 7 sati");
        assert_eq!(format_offset_phrase(20.4, &labels), "za 20 sati");
        assert_eq!(format_offset_phrase(-21.0, &labels), "prije 21 sat");
        assert_eq!(format_offset_phrase(22.0, &labels), "za 22 sata");
    }

    #[test]
    fn twenty_one_uses_dual_when_plural_forms_match() {
        let labels = LabelSet {
            hour2: "hours".to_string(),
            hour3: "hours".to_string(),
            ..LabelSet::english()
        };
        assert_eq!(format_offset_phrase(21.0, &labels), "in 21 hours");
        assert_eq!(format_offset_phrase(1.0, &labels), "in 1 hour");
    }
}
