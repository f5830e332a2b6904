// Attendance Rates - per-session and aggregate presence percentages

use crate::db::AttendanceSession;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// SESSION RATES
// ============================================================================

/// One session's attendance with its rounded percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRate {
    pub session_id: String,
    pub date: NaiveDate,
    pub present: u32,
    pub total: u32,
    pub rate_percent: u32,
}

/// Aggregate attendance across all sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub sessions: usize,
    pub present: u32,
    pub total: u32,
    pub rate_percent: u32,
}

/// Per-session rates in input order. A session with an empty roster rates 0.
pub fn session_rates(sessions: &[AttendanceSession]) -> Vec<SessionRate> {
    sessions
        .iter()
        .map(|s| SessionRate {
            session_id: s.id.clone(),
            date: s.date,
            present: s.present,
            total: s.total,
            rate_percent: rate_percent(s.present, s.total),
        })
        .collect()
}

/// Overall rate across every mark of every session.
/// `None` when there are no sessions, so callers can tell "no training
/// yet" apart from "nobody showed up".
pub fn summarize(sessions: &[AttendanceSession]) -> Option<AttendanceSummary> {
    if sessions.is_empty() {
        return None;
    }

    let present: u32 = sessions.iter().map(|s| s.present).sum();
    let total: u32 = sessions.iter().map(|s| s.total).sum();

    Some(AttendanceSummary {
        sessions: sessions.len(),
        present,
        total,
        rate_percent: rate_percent(present, total),
    })
}

fn rate_percent(present: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (present as f64 / total as f64 * 100.0).round() as u32
}

// ============================================================================
// TESTS
// ============================================================================
