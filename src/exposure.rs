//! Vocabulary exposure computation
//!
//! Pure with respect to the store: takes one consistent snapshot of a user's
//! watch history and counts, per search-result group, the occurrences the
//! user has plausibly seen. A user has reached playback time
//! `progress × duration` in a video, so an occurrence counts as exposed when
//! its start time lies at or before that point.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::WatchHistory;
use crate::search::VocabularySearchResult;

/// Window for the recent-exposure split
const RECENT_DAYS: i64 = 7;

/// Totals across all groups of one search response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureTotals {
    pub total_exposures: usize,
    pub recent_exposures: usize,
}

/// Annotate each group with its exposure count and accumulate the envelope
/// totals. `now` anchors the 7-day window, inclusive at `now − 7 days`.
pub fn annotate_exposure(
    watch_rows: &[WatchHistory],
    results: &mut [VocabularySearchResult],
    now: DateTime<Utc>,
) -> ExposureTotals {
    // Multiple rows for one video are tolerated: keep the furthest-watched
    let mut watch_map: HashMap<&str, &WatchHistory> = HashMap::new();
    for row in watch_rows {
        watch_map
            .entry(row.video_id.as_str())
            .and_modify(|current| {
                if row.progress * row.duration > current.progress * current.duration {
                    *current = row;
                }
            })
            .or_insert(row);
    }

    let cutoff = now - Duration::days(RECENT_DAYS);
    let mut totals = ExposureTotals { total_exposures: 0, recent_exposures: 0 };

    for group in results.iter_mut() {
        let mut exposed = 0;
        let mut recent = 0;

        for occurrence in &group.occurrences {
            let Some(row) = watch_map.get(occurrence.entry.video_id.as_str()) else {
                continue;
            };
            let max_watched = row.progress * row.duration;
            if occurrence.entry.start_time <= max_watched {
                exposed += 1;
                if row.last_watched >= cutoff {
                    recent += 1;
                }
            }
        }

        group.exposure_count = Some(exposed);
        totals.total_exposures += exposed;
        totals.recent_exposures += recent;
    }

    totals
}
