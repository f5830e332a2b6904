// Match Statistics - win/loss aggregation over completed matches
//
// Only matches with status == Completed participate. Volleyball has no
// draws, but equal scores must not break the aggregation: such a record
// counts in the total and in neither the won nor the lost bucket.

use crate::db::{MatchRecord, MatchStatus, TeamRecord};
use serde::{Deserialize, Serialize};

// ============================================================================
// SUMMARIES
// ============================================================================

/// Win/loss aggregate over a set of completed matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub win_rate_percent: u32,
}

impl MatchSummary {
    pub fn empty() -> Self {
        MatchSummary {
            total: 0,
            won: 0,
            lost: 0,
            win_rate_percent: 0,
        }
    }
}

/// One team's aggregate, ranked against the rest of the club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub team_name: String,
    pub total: usize,
    pub won: usize,
    pub lost: usize,
    pub win_rate_percent: u32,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Summarize all completed matches in the collection.
///
/// Win rate is `won / total * 100` rounded half-up, and defined as 0 for an
/// empty total so callers never hit a division error.
pub fn summarize_overall(matches: &[MatchRecord]) -> MatchSummary {
    let completed: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .collect();

    let won = completed.iter().filter(|m| m.score_us > m.score_them).count();
    let lost = completed.iter().filter(|m| m.score_us < m.score_them).count();

    MatchSummary {
        total: completed.len(),
        won,
        lost,
        win_rate_percent: win_rate_percent(won, completed.len()),
    }
}

/// Per-team aggregates, ranked by win rate (descending).
///
/// The ranking sort is stable: teams with equal win rates keep their input
/// order.
pub fn summarize_by_team(teams: &[TeamRecord], matches: &[MatchRecord]) -> Vec<TeamSummary> {
    let mut ranked: Vec<TeamSummary> = teams
        .iter()
        .map(|team| {
            let team_matches: Vec<MatchRecord> = matches
                .iter()
                .filter(|m| m.team_id == team.id)
                .cloned()
                .collect();
            let summary = summarize_overall(&team_matches);

            TeamSummary {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                total: summary.total,
                won: summary.won,
                lost: summary.lost,
                win_rate_percent: summary.win_rate_percent,
            }
        })
        .collect();

    // Vec::sort_by is stable, which is what keeps tied teams in input order
    ranked.sort_by(|a, b| b.win_rate_percent.cmp(&a.win_rate_percent));
    ranked
}

fn win_rate_percent(won: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (won as f64 / total as f64 * 100.0).round() as u32
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_match(team_id: &str, status: MatchStatus, us: u32, them: u32) -> MatchRecord {
        MatchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            team_id: team_id.to_string(),
            opponent: "Rival".to_string(),
            status,
            score_us: us,
            score_them: them,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_empty_collection_is_all_zero() {
        let summary = summarize_overall(&[]);
        assert_eq!(summary, MatchSummary::empty());
    }

    #[test]
    fn test_only_completed_matches_count() {
        let matches = vec![
            create_match("a", MatchStatus::Completed, 3, 0),
            create_match("a", MatchStatus::Scheduled, 0, 0),
            create_match("a", MatchStatus::Canceled, 2, 3),
            create_match("a", MatchStatus::Completed, 1, 3),
        ];

        let summary = summarize_overall(&matches);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.won, 1);
        assert_eq!(summary.lost, 1);
        assert_eq!(summary.win_rate_percent, 50);
    }

    #[test]
    fn test_equal_scores_count_in_neither_bucket() {
        let matches = vec![
            create_match("a", MatchStatus::Completed, 2, 2),
            create_match("a", MatchStatus::Completed, 3, 1),
        ];

        let summary = summarize_overall(&matches);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.won, 1);
        assert_eq!(summary.lost, 0);
        assert!(summary.won + summary.lost <= summary.total);
    }

    #[test]
    fn test_win_rate_rounds_half_up() {
        // 1/3 -> 33.33 -> 33, 2/3 -> 66.67 -> 67
        let matches = vec![
            create_match("a", MatchStatus::Completed, 3, 0),
            create_match("a", MatchStatus::Completed, 0, 3),
            create_match("a", MatchStatus::Completed, 1, 3),
        ];
        assert_eq!(summarize_overall(&matches).win_rate_percent, 33);

        // 1/8 -> 12.5 -> 13
        let mut eight = vec![create_match("a", MatchStatus::Completed, 3, 1)];
        for _ in 0..7 {
            eight.push(create_match("a", MatchStatus::Completed, 0, 3));
        }
        assert_eq!(summarize_overall(&eight).win_rate_percent, 13);
    }

    #[test]
    fn test_by_team_restricts_to_each_team() {
        let teams = vec![TeamRecord::new("Senior"), TeamRecord::new("U17")];
        let matches = vec![
            create_match(&teams[0].id, MatchStatus::Completed, 3, 0),
            create_match(&teams[0].id, MatchStatus::Completed, 3, 2),
            create_match(&teams[1].id, MatchStatus::Completed, 0, 3),
        ];

        let ranked = summarize_by_team(&teams, &matches);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].team_name, "Senior");
        assert_eq!(ranked[0].won, 2);
        assert_eq!(ranked[0].win_rate_percent, 100);
        assert_eq!(ranked[1].team_name, "U17");
        assert_eq!(ranked[1].win_rate_percent, 0);
    }

    #[test]
    fn test_ranking_sorts_descending_by_win_rate() {
        let teams = vec![TeamRecord::new("Low"), TeamRecord::new("High")];
        let matches = vec![
            create_match(&teams[0].id, MatchStatus::Completed, 0, 3),
            create_match(&teams[1].id, MatchStatus::Completed, 3, 0),
        ];

        let ranked = summarize_by_team(&teams, &matches);
        assert_eq!(ranked[0].team_name, "High");
        assert_eq!(ranked[1].team_name, "Low");
    }

    #[test]
    fn test_ranking_is_stable_on_ties() {
        // Three teams, all at 100%: input order must survive the sort
        let teams = vec![
            TeamRecord::new("First"),
            TeamRecord::new("Second"),
            TeamRecord::new("Third"),
        ];
        let matches: Vec<MatchRecord> = teams
            .iter()
            .map(|t| create_match(&t.id, MatchStatus::Completed, 3, 1))
            .collect();

        let ranked = summarize_by_team(&teams, &matches);
        let names: Vec<&str> = ranked.iter().map(|t| t.team_name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_team_without_matches_ranks_last_at_zero() {
        let teams = vec![TeamRecord::new("Idle"), TeamRecord::new("Busy")];
        let matches = vec![create_match(&teams[1].id, MatchStatus::Completed, 3, 0)];

        let ranked = summarize_by_team(&teams, &matches);
        assert_eq!(ranked[0].team_name, "Busy");
        assert_eq!(ranked[1].team_name, "Idle");
        assert_eq!(ranked[1].total, 0);
        assert_eq!(ranked[1].win_rate_percent, 0);
    }
}
