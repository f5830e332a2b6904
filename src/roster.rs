// Roster Demographics - gender counts, average height, average age
//
// The reference date is always supplied by the caller; nothing in here
// reads a clock, so identical inputs always produce identical summaries.

use crate::db::{Gender, PlayerRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per year including the leap-year correction
const DAYS_PER_YEAR: f64 = 365.25;

// ============================================================================
// SUMMARY
// ============================================================================

/// Demographic aggregate over a roster.
///
/// `male + female` may be less than `total`: players with an unspecified
/// gender count toward the total only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    /// Mean of the valid heights, rounded to 2 decimals; 0 when none valid
    pub avg_height_cm: f64,
    /// Mean of the valid ages, floored; 0 when none valid
    pub avg_age_years: i64,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Summarize a roster at the given reference date.
///
/// Returns `None` for an empty roster so callers can tell "no data" apart
/// from "population with all-zero metrics". Absent or non-positive heights
/// and ages are excluded from their averages, never treated as zero.
pub fn summarize(players: &[PlayerRecord], reference_date: NaiveDate) -> Option<RosterSummary> {
    if players.is_empty() {
        return None;
    }

    let male = players.iter().filter(|p| p.gender == Gender::Male).count();
    let female = players.iter().filter(|p| p.gender == Gender::Female).count();

    let heights: Vec<f64> = players
        .iter()
        .filter_map(|p| p.height_cm)
        .filter(|h| *h > 0.0)
        .collect();
    let avg_height_cm = if heights.is_empty() {
        0.0
    } else {
        let mean = heights.iter().sum::<f64>() / heights.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    let ages: Vec<i64> = players
        .iter()
        .filter_map(|p| p.date_of_birth)
        .map(|dob| age_years(dob, reference_date))
        .filter(|age| *age > 0)
        .collect();
    let avg_age_years = if ages.is_empty() {
        0
    } else {
        ages.iter().sum::<i64>() / ages.len() as i64
    };

    Some(RosterSummary {
        total: players.len(),
        male,
        female,
        avg_height_cm,
        avg_age_years,
    })
}

/// Whole years between birth and the reference date.
/// Negative when the birth date lies in the future; callers filter those out.
pub fn age_years(date_of_birth: NaiveDate, reference_date: NaiveDate) -> i64 {
    let days = (reference_date - date_of_birth).num_days();
    (days as f64 / DAYS_PER_YEAR).floor() as i64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn create_player(gender: Gender, height_cm: f64, dob: (i32, u32, u32)) -> PlayerRecord {
        let mut player = PlayerRecord::new("Test", "Player", gender);
        player.height_cm = Some(height_cm);
        player.date_of_birth = NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2);
        player
    }

    #[test]
    fn test_empty_roster_is_none() {
        assert_eq!(summarize(&[], reference()), None);
    }

    #[test]
    fn test_mixed_roster() {
        let players = vec![
            create_player(Gender::Male, 180.0, (2000, 1, 1)),
            create_player(Gender::Female, 170.0, (2005, 1, 1)),
            create_player(Gender::Male, 190.0, (1995, 1, 1)),
        ];

        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.male, 2);
        assert_eq!(summary.female, 1);
        assert_eq!(summary.avg_height_cm, 180.0);
        // Ages at 2024-06-01: 24, 19, 29 -> mean 24
        assert_eq!(summary.avg_age_years, 24);
    }

    #[test]
    fn test_unspecified_gender_counts_in_neither_bucket() {
        let players = vec![
            create_player(Gender::Male, 180.0, (2000, 1, 1)),
            create_player(Gender::Unspecified, 175.0, (2001, 1, 1)),
        ];

        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.male, 1);
        assert_eq!(summary.female, 0);
    }

    #[test]
    fn test_invalid_heights_are_excluded() {
        let mut no_height = PlayerRecord::new("No", "Height", Gender::Female);
        no_height.date_of_birth = NaiveDate::from_ymd_opt(2002, 3, 3);

        let players = vec![
            create_player(Gender::Male, 180.0, (2000, 1, 1)),
            create_player(Gender::Male, 0.0, (2000, 1, 1)),
            create_player(Gender::Male, -5.0, (2000, 1, 1)),
            no_height,
        ];

        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.avg_height_cm, 180.0);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_no_valid_heights_averages_to_zero() {
        let players = vec![create_player(Gender::Female, 0.0, (2000, 1, 1))];
        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.avg_height_cm, 0.0);
    }

    #[test]
    fn test_height_rounds_to_two_decimals() {
        let players = vec![
            create_player(Gender::Female, 170.0, (2000, 1, 1)),
            create_player(Gender::Female, 171.0, (2000, 1, 1)),
            create_player(Gender::Female, 171.0, (2000, 1, 1)),
        ];
        // 512 / 3 = 170.666... -> 170.67
        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.avg_height_cm, 170.67);
    }

    #[test]
    fn test_missing_and_future_birth_dates_are_excluded() {
        let mut no_dob = PlayerRecord::new("No", "Dob", Gender::Male);
        no_dob.height_cm = Some(182.0);

        let players = vec![
            create_player(Gender::Male, 180.0, (2000, 1, 1)),
            // Born after the reference date: negative age, excluded
            create_player(Gender::Male, 181.0, (2030, 1, 1)),
            no_dob,
        ];

        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.avg_age_years, 24);
    }

    #[test]
    fn test_no_valid_ages_averages_to_zero() {
        let players = vec![create_player(Gender::Male, 180.0, (2030, 1, 1))];
        let summary = summarize(&players, reference()).unwrap();
        assert_eq!(summary.avg_age_years, 0);
    }

    #[test]
    fn test_age_floors_partial_years() {
        // One day before the 20th birthday
        let dob = NaiveDate::from_ymd_opt(2004, 6, 2).unwrap();
        assert_eq!(age_years(dob, reference()), 19);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let players = vec![create_player(Gender::Female, 170.0, (2003, 4, 15))];
        let first = summarize(&players, reference());
        let second = summarize(&players, reference());
        assert_eq!(first, second);
    }
}
