// Dues Ledger - monthly membership fee tracking
//
// A month counts as paid when an Income movement in the Dues category is
// tagged to it, either explicitly through its period key or, for legacy
// rows without one, by transaction date. Debt counting only looks at the
// current year and only once the policy's tracking year is reached.

use crate::db::{MovementKind, PaymentRecord, PlayerRecord, TeamRecord};
use crate::period::MonthKey;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Treasury category that settles a monthly fee
pub const DUES_CATEGORY: &str = "Dues";

// ============================================================================
// DEBT POLICY
// ============================================================================

/// Club policy for when unpaid months start counting as debt.
///
/// Months in years before `tracking_start_year` are exempt: the club ran
/// without enforced dues before that cutoff and never bills retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtPolicy {
    pub tracking_start_year: i32,
}

impl DebtPolicy {
    pub fn new(tracking_start_year: i32) -> Self {
        DebtPolicy {
            tracking_start_year,
        }
    }
}

impl Default for DebtPolicy {
    fn default() -> Self {
        // First season with enforced monthly dues
        DebtPolicy {
            tracking_start_year: 2026,
        }
    }
}

// ============================================================================
// MONTH SETTLEMENT
// ============================================================================

/// Find the payment that settles `month` for a player, if any.
///
/// A movement matches when it is Income in the Dues category for this
/// player, and either its period key starts with the month's "YYYY-MM" form
/// or, when it has no period key, its transaction date falls inside the
/// month. First match wins.
pub fn is_month_paid<'a>(
    player_id: &str,
    month: MonthKey,
    payments: &'a [PaymentRecord],
) -> Option<&'a PaymentRecord> {
    let key = month.key();

    payments.iter().find(|p| {
        if p.kind != MovementKind::Income || p.category != DUES_CATEGORY {
            return false;
        }
        if p.player_id.as_deref() != Some(player_id) {
            return false;
        }
        match &p.period_key {
            Some(period) => period.starts_with(&key),
            None => month.contains(p.date),
        }
    })
}

/// Count unpaid months from January of `as_of`'s year through the `as_of`
/// month inclusive.
///
/// Returns 0 before the policy's tracking year. Prior years are never
/// evaluated, so clearing January debt in March never resurrects December.
pub fn count_debt_months(
    player_id: &str,
    as_of: NaiveDate,
    payments: &[PaymentRecord],
    policy: &DebtPolicy,
) -> u32 {
    if as_of.year() < policy.tracking_start_year {
        return 0;
    }

    MonthKey::months_through(as_of.year(), as_of.month())
        .into_iter()
        .filter(|month| is_month_paid(player_id, *month, payments).is_none())
        .count() as u32
}

// ============================================================================
// MONTH STATUS
// ============================================================================

/// Settlement state of one month on a player's dues timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonthStatus {
    /// Settled by the carried payment
    Paid(PaymentRecord),
    /// Past and unpaid, but the month precedes the tracking year
    Exempt,
    /// Past, unpaid, and inside the tracking window
    Overdue,
    /// The month containing `as_of`
    Current,
    /// Not reached yet
    Future,
}

impl MonthStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, MonthStatus::Paid(_))
    }
}

/// Classify one month of a player's dues timeline relative to `as_of`
pub fn month_status(
    player_id: &str,
    month: MonthKey,
    as_of: NaiveDate,
    payments: &[PaymentRecord],
    policy: &DebtPolicy,
) -> MonthStatus {
    if let Some(payment) = is_month_paid(player_id, month, payments) {
        return MonthStatus::Paid(payment.clone());
    }

    let current = MonthKey::from_date(as_of);
    if month > current {
        MonthStatus::Future
    } else if month == current {
        MonthStatus::Current
    } else if month.year < policy.tracking_start_year {
        MonthStatus::Exempt
    } else {
        MonthStatus::Overdue
    }
}

// ============================================================================
// ROSTER VIEW
// ============================================================================

/// One player's paid flag for a target month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDuesStatus {
    pub player_id: String,
    pub player_name: String,
    pub paid: bool,
}

/// A team's roster with per-player paid flags and a paid counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDuesGroup {
    /// None for the bucket of players without a team assignment
    pub team_id: Option<String>,
    pub team_name: String,
    pub members: Vec<PlayerDuesStatus>,
    pub paid: usize,
}

/// Group the roster by team with each player's paid flag for `month`.
///
/// Teams appear in input order; players whose team is missing from `teams`
/// (or unset) land in a trailing "Unassigned" group. Teams without players
/// are omitted.
pub fn dues_roster(
    players: &[PlayerRecord],
    teams: &[TeamRecord],
    month: MonthKey,
    payments: &[PaymentRecord],
) -> Vec<TeamDuesGroup> {
    let status_of = |player: &PlayerRecord| PlayerDuesStatus {
        player_id: player.id.clone(),
        player_name: player.full_name(),
        paid: is_month_paid(&player.id, month, payments).is_some(),
    };

    let mut groups = Vec::new();
    let mut grouped_ids: Vec<&str> = Vec::new();

    for team in teams {
        let members: Vec<PlayerDuesStatus> = players
            .iter()
            .filter(|p| p.team_id.as_deref() == Some(team.id.as_str()))
            .map(|p| {
                grouped_ids.push(p.id.as_str());
                status_of(p)
            })
            .collect();

        if members.is_empty() {
            continue;
        }

        let paid = members.iter().filter(|m| m.paid).count();
        groups.push(TeamDuesGroup {
            team_id: Some(team.id.clone()),
            team_name: team.name.clone(),
            members,
            paid,
        });
    }

    let unassigned: Vec<PlayerDuesStatus> = players
        .iter()
        .filter(|p| !grouped_ids.contains(&p.id.as_str()))
        .map(status_of)
        .collect();

    if !unassigned.is_empty() {
        let paid = unassigned.iter().filter(|m| m.paid).count();
        groups.push(TeamDuesGroup {
            team_id: None,
            team_name: "Unassigned".to_string(),
            members: unassigned,
            paid,
        });
    }

    groups
}

// ============================================================================
// TESTS
// ============================================================================
