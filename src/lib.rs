// Clubdesk - Sports Club Management Core
// Exposes all modules for use in the CLI, API server, and tests

pub mod db;
pub mod period;
pub mod match_stats;
pub mod roster;
pub mod dues;
pub mod validation;
pub mod treasury;
pub mod attendance;

// Re-export commonly used types
pub use db::{
    AttendanceSession, Gender, MatchRecord, MatchStatus, MovementKind, PaymentRecord,
    PlayerRecord, SnapshotCounts, TeamRecord,
    setup_database, load_movements_csv,
    insert_teams, insert_players, insert_matches, insert_movements, insert_sessions,
    get_all_teams, get_all_players, get_all_matches, get_all_movements, get_all_sessions,
    get_movements_for_player, snapshot_counts,
};
pub use period::MonthKey;
pub use match_stats::{MatchSummary, TeamSummary, summarize_by_team, summarize_overall};
pub use roster::{RosterSummary, age_years};
pub use dues::{
    DebtPolicy, MonthStatus, PlayerDuesStatus, TeamDuesGroup, DUES_CATEGORY,
    count_debt_months, dues_roster, is_month_paid, month_status,
};
pub use validation::{
    CheckResult, ProfileAudit, Severity, audit_profile, validate_national_id, validate_phone,
};
pub use treasury::{PlayerCollection, TournamentLedger, TreasurySummary, tournament_ledger};
pub use attendance::{AttendanceSummary, SessionRate, session_rates};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
