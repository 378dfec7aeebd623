use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Session dates older than this are never consulted.
pub const STREAK_LOOKBACK_DAYS: u64 = 365;

pub const DEFAULT_RECENT_DAYS: u32 = 10;
pub const MAX_RECENT_DAYS: u32 = 30;

/// Consecutive days with at least one session, ending today or yesterday.
///
/// A day without a session yet does not break the streak until it is over.
pub fn current_streak(session_dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut check = if session_dates.contains(&today) {
        Some(today)
    } else {
        today.pred_opt()
    };

    let mut streak = 0;
    while let Some(day) = check {
        if !session_dates.contains(&day) || u64::from(streak) >= STREAK_LOOKBACK_DAYS {
            break;
        }
        streak += 1;
        check = day.pred_opt();
    }
    streak
}

/// Earliest date the streak query needs to look at.
pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(STREAK_LOOKBACK_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakDay {
    pub date: NaiveDate,
    pub read: bool,
}

/// Recent reading days alongside the current streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakOverview {
    /// Oldest first, ending today.
    pub days: Vec<StreakDay>,
    pub streak: u32,
    pub today_read: bool,
}

impl StreakOverview {
    pub fn build(session_dates: &HashSet<NaiveDate>, today: NaiveDate, days: u32) -> Self {
        let days = days.clamp(1, MAX_RECENT_DAYS);
        let mut recent: Vec<StreakDay> = (0..days)
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|date| StreakDay {
                date,
                read: session_dates.contains(&date),
            })
            .collect();
        recent.reverse();

        Self {
            days: recent,
            streak: current_streak(session_dates, today),
            today_read: session_dates.contains(&today),
        }
    }
}
