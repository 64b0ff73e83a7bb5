//! Figures derived from the activity log.
//!
//! Only the last few log entries are polled (the activity limit), so
//! everything here is a lower bound over that window.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::emby_client::{parse_emby_date, ActivityEntry};

/// Minutes credited per playback when estimating watch time. The activity
/// log carries no durations, so the estimate is approximate.
pub const ESTIMATED_MINUTES_PER_PLAYBACK: i64 = 30;

pub const RECENTLY_ADDED_DAYS: i64 = 7;

const ADDED_MARKERS: [&str; 3] = ["Added", "Create", "New"];

pub fn is_playback(entry: &ActivityEntry) -> bool {
    entry
        .entry_type
        .as_deref()
        .is_some_and(|kind| kind.contains("Playback"))
}

fn is_addition(entry: &ActivityEntry) -> bool {
    entry
        .entry_type
        .as_deref()
        .is_some_and(|kind| ADDED_MARKERS.iter().any(|marker| kind.contains(marker)))
}

fn entry_time(entry: &ActivityEntry) -> Option<DateTime<Utc>> {
    entry.date.as_deref().and_then(parse_emby_date)
}

/// Playback entries dated on the same calendar day as `now`, in `now`'s zone.
pub fn playbacks_today<'a, Tz: TimeZone>(
    entries: &'a [ActivityEntry],
    now: &DateTime<Tz>,
) -> Vec<&'a ActivityEntry> {
    let today = now.date_naive();
    let zone = now.timezone();
    entries
        .iter()
        .filter(|entry| is_playback(entry))
        .filter(|entry| {
            entry_time(entry)
                .map(|when| when.with_timezone(&zone).date_naive() == today)
                .unwrap_or(false)
        })
        .collect()
}

pub fn estimated_watch_minutes(playback_count: usize) -> i64 {
    i64::try_from(playback_count)
        .unwrap_or(i64::MAX)
        .saturating_mul(ESTIMATED_MINUTES_PER_PLAYBACK)
}

/// Library additions from the last week, newest first.
pub fn recently_added<'a, Tz: TimeZone>(
    entries: &'a [ActivityEntry],
    now: &DateTime<Tz>,
) -> Vec<(DateTime<Utc>, &'a ActivityEntry)> {
    let cutoff = now.with_timezone(&Utc) - Duration::days(RECENTLY_ADDED_DAYS);
    let mut added: Vec<_> = entries
        .iter()
        .filter(|entry| is_addition(entry))
        .filter_map(|entry| entry_time(entry).map(|when| (when, entry)))
        .filter(|(when, _)| *when >= cutoff)
        .collect();
    added.sort_by(|a, b| b.0.cmp(&a.0));
    added
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: &str, name: &str, date: &str) -> ActivityEntry {
        ActivityEntry {
            entry_type: Some(kind.to_string()),
            name: Some(name.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap()
    }

    #[test]
    fn counts_only_todays_playbacks() {
        let log = vec![
            entry("VideoPlayback", "a", "2024-03-05T09:00:00.0000000Z"),
            entry("VideoPlaybackStopped", "b", "2024-03-05T10:00:00Z"),
            entry("VideoPlayback", "c", "2024-03-04T23:59:00Z"),
            entry("UserSignedIn", "d", "2024-03-05T11:00:00Z"),
            entry("AudioPlayback", "e", "not a date"),
        ];

        let today = playbacks_today(&log, &noon());
        assert_eq!(today.len(), 2);
        assert_eq!(estimated_watch_minutes(today.len()), 60);
    }

    #[test]
    fn recently_added_is_newest_first_within_a_week() {
        let log = vec![
            entry("ItemAdded", "older", "2024-03-01T08:00:00Z"),
            entry("ItemAdded", "stale", "2024-02-20T08:00:00Z"),
            entry("LibraryItemCreated", "newest", "2024-03-05T08:00:00Z"),
            entry("VideoPlayback", "ignored", "2024-03-05T09:00:00Z"),
        ];

        let added = recently_added(&log, &noon());
        let names: Vec<_> = added
            .iter()
            .map(|(_, entry)| entry.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["newest", "older"]);
    }

    #[test]
    fn additions_outlive_the_reference_time() {
        let log = vec![entry("ItemAdded", "kept", "2024-03-04T08:00:00Z")];
        let added = {
            let now = noon().with_timezone(&chrono::FixedOffset::east_opt(3600).unwrap());
            recently_added(&log, &now)
        };
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].1.name.as_deref(), Some("kept"));
    }
}
