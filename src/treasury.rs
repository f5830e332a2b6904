// Treasury - income/expense totals and tournament collection ledgers

use crate::db::{MovementKind, PaymentRecord};
use crate::period::MonthKey;
use serde::{Deserialize, Serialize};

// ============================================================================
// TREASURY SUMMARY
// ============================================================================

/// Income, expenses, and the running balance over a set of movements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreasurySummary {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl TreasurySummary {
    pub fn summary(&self) -> String {
        format!(
            "Income ${:.2}, expenses ${:.2}, balance ${:.2}",
            self.income, self.expense, self.balance
        )
    }
}

/// Totals over every movement in the collection
pub fn summarize(movements: &[PaymentRecord]) -> TreasurySummary {
    let income = sum_of(movements, MovementKind::Income);
    let expense = sum_of(movements, MovementKind::Expense);

    TreasurySummary {
        income,
        expense,
        balance: income - expense,
    }
}

/// Totals restricted to movements dated inside `month`
pub fn summarize_month(movements: &[PaymentRecord], month: MonthKey) -> TreasurySummary {
    let scoped: Vec<PaymentRecord> = movements
        .iter()
        .filter(|m| month.contains(m.date))
        .cloned()
        .collect();
    summarize(&scoped)
}

fn sum_of(movements: &[PaymentRecord], kind: MovementKind) -> f64 {
    movements
        .iter()
        .filter(|m| m.kind == kind)
        .map(|m| m.amount)
        .sum()
}

// ============================================================================
// TOURNAMENT LEDGER
// ============================================================================

/// What one rostered player has put toward a tournament fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCollection {
    pub player_id: String,
    pub collected: f64,
}

/// Collection state for a tournament roster.
///
/// Expected = roster size x cost per player; collected sums every payment
/// in the tournament's ledger; pending is whatever is still owed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentLedger {
    pub expected: f64,
    pub collected: f64,
    pub pending: f64,
    pub per_player: Vec<PlayerCollection>,
}

/// Build the collection ledger for a tournament.
///
/// `roster` lists the registered player ids; `payments` is the tournament's
/// own payment ledger (already scoped by the caller). Payments from players
/// outside the roster still count toward `collected` but get no per-player
/// row.
pub fn tournament_ledger(
    roster: &[String],
    cost_per_player: f64,
    payments: &[PaymentRecord],
) -> TournamentLedger {
    let expected = roster.len() as f64 * cost_per_player;
    let collected: f64 = payments.iter().map(|p| p.amount).sum();

    let per_player = roster
        .iter()
        .map(|player_id| PlayerCollection {
            player_id: player_id.clone(),
            collected: payments
                .iter()
                .filter(|p| p.player_id.as_deref() == Some(player_id.as_str()))
                .map(|p| p.amount)
                .sum(),
        })
        .collect();

    TournamentLedger {
        expected,
        collected,
        pending: expected - collected,
        per_player,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn movement(kind: MovementKind, amount: f64, date: (i32, u32, u32)) -> PaymentRecord {
        PaymentRecord {
            id: uuid::Uuid::new_v4().to_string(),
            player_id: None,
            description: "Movement".to_string(),
            category: "General".to_string(),
            kind,
            amount,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            period_key: None,
        }
    }

    #[test]
    fn test_empty_movements_balance_to_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.income, 0.0);
        assert_eq!(summary.expense, 0.0);
        assert_eq!(summary.balance, 0.0);
    }

    #[test]
    fn test_balance_is_income_minus_expense() {
        let movements = vec![
            movement(MovementKind::Income, 100.0, (2026, 1, 5)),
            movement(MovementKind::Income, 50.0, (2026, 1, 12)),
            movement(MovementKind::Expense, 30.0, (2026, 1, 20)),
        ];

        let summary = summarize(&movements);
        assert_eq!(summary.income, 150.0);
        assert_eq!(summary.expense, 30.0);
        assert_eq!(summary.balance, 120.0);
    }

    #[test]
    fn test_month_scoped_totals() {
        let movements = vec![
            movement(MovementKind::Income, 100.0, (2026, 1, 5)),
            movement(MovementKind::Income, 75.0, (2026, 2, 5)),
            movement(MovementKind::Expense, 20.0, (2026, 2, 9)),
        ];

        let feb = summarize_month(&movements, MonthKey::from_parts(2026, 2).unwrap());
        assert_eq!(feb.income, 75.0);
        assert_eq!(feb.expense, 20.0);
        assert_eq!(feb.balance, 55.0);
    }

    #[test]
    fn test_tournament_ledger_totals() {
        let roster = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];

        let mut paid_full = movement(MovementKind::Income, 40.0, (2026, 5, 1));
        paid_full.player_id = Some("p1".to_string());
        let mut paid_half = movement(MovementKind::Income, 20.0, (2026, 5, 3));
        paid_half.player_id = Some("p2".to_string());

        let ledger = tournament_ledger(&roster, 40.0, &[paid_full, paid_half]);

        assert_eq!(ledger.expected, 120.0);
        assert_eq!(ledger.collected, 60.0);
        assert_eq!(ledger.pending, 60.0);

        assert_eq!(ledger.per_player.len(), 3);
        assert_eq!(ledger.per_player[0].collected, 40.0);
        assert_eq!(ledger.per_player[1].collected, 20.0);
        assert_eq!(ledger.per_player[2].collected, 0.0);
    }

    #[test]
    fn test_tournament_ledger_empty_roster() {
        let ledger = tournament_ledger(&[], 40.0, &[]);
        assert_eq!(ledger.expected, 0.0);
        assert_eq!(ledger.collected, 0.0);
        assert_eq!(ledger.pending, 0.0);
        assert!(ledger.per_player.is_empty());
    }
}
