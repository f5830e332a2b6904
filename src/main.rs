use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use std::env;
use std::path::Path;

use clubdesk::{
    attendance, dues, match_stats, roster, treasury, DebtPolicy, MonthKey,
    get_all_matches, get_all_movements, get_all_players, get_all_sessions, get_all_teams,
    insert_movements, load_movements_csv, setup_database, snapshot_counts,
};

const DEFAULT_DB: &str = "clubdesk.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("import") => {
            let csv_path = match args.get(2) {
                Some(path) => path.as_str(),
                None => {
                    eprintln!("Usage: clubdesk import <movements.csv> [db]");
                    std::process::exit(1)
                }
            };
            let db_path = args.get(3).map(String::as_str).unwrap_or(DEFAULT_DB);
            run_import(Path::new(csv_path), Path::new(db_path))
        }
        Some("report") => {
            let db_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_DB);
            run_report(Path::new(db_path))
        }
        _ => {
            eprintln!("Usage: clubdesk <import|report> [...]");
            eprintln!("  import <movements.csv> [db]   Load treasury movements into the store");
            eprintln!("  report [db]                   Print club summaries for the snapshot");
            std::process::exit(1);
        }
    }
}

fn run_import(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("Importing treasury movements: CSV -> SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let movements = load_movements_csv(csv_path)?;
    println!("✓ Loaded {} movements from {}", movements.len(), csv_path.display());

    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    let (inserted, duplicates) = insert_movements(&conn, &movements)?;
    println!("✓ Inserted: {} movements", inserted);
    println!("✓ Skipped duplicates: {}", duplicates);

    let counts = snapshot_counts(&conn)?;
    println!("✓ Store now holds {} movements", counts.movements);

    Ok(())
}

fn run_report(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        eprintln!("Database not found: {}", db_path.display());
        eprintln!("Run: clubdesk import <movements.csv> first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)?;

    let teams = get_all_teams(&conn)?;
    let players = get_all_players(&conn)?;
    let matches = get_all_matches(&conn)?;
    let movements = get_all_movements(&conn)?;
    let sessions = get_all_sessions(&conn)?;

    // The calculation layer never reads a clock; today is resolved here
    let today = Utc::now().date_naive();
    let this_month = MonthKey::from_date(today);

    println!("Club report — {}", today);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let overall = match_stats::summarize_overall(&matches);
    println!(
        "Matches: {} played, {} won, {} lost, {}% win rate",
        overall.total, overall.won, overall.lost, overall.win_rate_percent
    );

    for team in match_stats::summarize_by_team(&teams, &matches) {
        println!(
            "  {:<20} {:>3} played  {:>3} won  {:>3}%",
            team.team_name, team.total, team.won, team.win_rate_percent
        );
    }

    match roster::summarize(&players, today) {
        Some(summary) => println!(
            "Roster: {} players ({} M / {} F), avg height {:.2} cm, avg age {}",
            summary.total, summary.male, summary.female,
            summary.avg_height_cm, summary.avg_age_years
        ),
        None => println!("Roster: no players registered"),
    }

    let totals = treasury::summarize(&movements);
    println!("Treasury: {}", totals.summary());

    println!("Dues for {}:", this_month);
    let policy = DebtPolicy::default();
    for group in dues::dues_roster(&players, &teams, this_month, &movements) {
        println!(
            "  {:<20} {}/{} paid",
            group.team_name,
            group.paid,
            group.members.len()
        );
        for member in group.members.iter().filter(|m| !m.paid) {
            let debt = dues::count_debt_months(&member.player_id, today, &movements, &policy);
            println!("    {:<24} {} month(s) owing", member.player_name, debt);
        }
    }

    match attendance::summarize(&sessions) {
        Some(summary) => println!(
            "Attendance: {} sessions, {}/{} present ({}%)",
            summary.sessions, summary.present, summary.total, summary.rate_percent
        ),
        None => println!("Attendance: no sessions recorded"),
    }

    Ok(())
}
