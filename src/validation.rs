// Identity Validation - Ecuadorian cédula/RUC and mobile phone shapes
//
// The validators check shape only, never presence: empty input is accepted
// because both fields are optional on the roster form. "Required" semantics
// belong to the caller.

use crate::db::PlayerRecord;
use serde::{Deserialize, Serialize};

/// Per-position weights for the natural-person checksum
const CEDULA_COEFFICIENTS: [u32; 9] = [2, 1, 2, 1, 2, 1, 2, 1, 2];

// ============================================================================
// SHAPE VALIDATORS
// ============================================================================

/// Validate an Ecuadorian mobile number.
///
/// All non-digits are stripped first, so "(09) 9123-4567" passes. Accepted
/// shapes are `5939` + 8 digits (international) and `09` + 8 digits (local).
pub fn validate_phone(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }

    let clean = digits_of(raw);

    (clean.len() == 12 && clean.starts_with("5939"))
        || (clean.len() == 10 && clean.starts_with("09"))
}

/// Validate an Ecuadorian national id: cédula (10 digits) or RUC (13).
///
/// Checks, in order: length, province code (01-24 or 30), and for natural
/// persons (third digit < 6) the modulus-10 checksum over the first nine
/// digits. Juridical and public-entity RUCs (third digit >= 6) pass on
/// length and province alone; their modulus-11 scheme is not verified.
pub fn validate_national_id(raw: &str) -> bool {
    if raw.is_empty() {
        return true;
    }

    let clean = digits_of(raw);
    if clean.len() != 10 && clean.len() != 13 {
        return false;
    }

    let digits: Vec<u32> = clean.chars().filter_map(|c| c.to_digit(10)).collect();

    let province = digits[0] * 10 + digits[1];
    if !(1..=24).contains(&province) && province != 30 {
        return false;
    }

    let third_digit = digits[2];
    if third_digit < 6 {
        return cedula_check_digit(&digits[0..9]) == digits[9];
    }

    true
}

fn digits_of(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Modulus-10 check digit over the first nine digits of a cédula.
/// Each product of two digits is reduced by 9 (its digit sum).
fn cedula_check_digit(digits: &[u32]) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip(CEDULA_COEFFICIENTS.iter())
        .map(|(digit, coefficient)| {
            let product = digit * coefficient;
            if product >= 10 {
                product - 9
            } else {
                product
            }
        })
        .sum();

    if sum % 10 == 0 {
        0
    } else {
        10 - (sum % 10)
    }
}

// ============================================================================
// PROFILE AUDIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Field value is malformed
    Critical,
    /// Field value is questionable or will be ignored by aggregates
    Warning,
    /// Field is absent but optional
    Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl CheckResult {
    pub fn pass(field: &str, message: &str) -> Self {
        CheckResult {
            passed: true,
            field: field.to_string(),
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn fail(field: &str, message: &str, severity: Severity) -> Self {
        CheckResult {
            passed: false,
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

/// Field-by-field shape audit of a player profile.
///
/// `passed` is false only on Critical findings; Warnings and Infos flag
/// values the aggregates will silently skip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAudit {
    pub player_id: String,
    pub checks: Vec<CheckResult>,
    pub passed: bool,
}

impl ProfileAudit {
    pub fn issues(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

pub fn audit_profile(player: &PlayerRecord) -> ProfileAudit {
    let mut checks = Vec::new();

    // National id shape
    match player.national_id.as_deref() {
        None | Some("") => checks.push(CheckResult::pass("national_id", "Not provided (optional)")),
        Some(id) if validate_national_id(id) => {
            checks.push(CheckResult::pass("national_id", "Valid cédula/RUC shape"))
        }
        Some(id) => checks.push(CheckResult::fail(
            "national_id",
            &format!("Not a valid cédula or RUC: {}", id),
            Severity::Critical,
        )),
    }

    // Phone shape
    match player.phone.as_deref() {
        None | Some("") => checks.push(CheckResult::pass("phone", "Not provided (optional)")),
        Some(phone) if validate_phone(phone) => {
            checks.push(CheckResult::pass("phone", "Valid mobile shape"))
        }
        Some(phone) => checks.push(CheckResult::fail(
            "phone",
            &format!("Not an Ecuadorian mobile number: {}", phone),
            Severity::Critical,
        )),
    }

    // Height plausibility: non-positive values are dropped from averages
    match player.height_cm {
        None => checks.push(CheckResult::fail(
            "height_cm",
            "Missing height, excluded from demographics",
            Severity::Info,
        )),
        Some(h) if h > 0.0 => checks.push(CheckResult::pass("height_cm", "Height recorded")),
        Some(h) => checks.push(CheckResult::fail(
            "height_cm",
            &format!("Non-positive height ({}), excluded from demographics", h),
            Severity::Warning,
        )),
    }

    // Birth date presence
    match player.date_of_birth {
        Some(_) => checks.push(CheckResult::pass("date_of_birth", "Birth date recorded")),
        None => checks.push(CheckResult::fail(
            "date_of_birth",
            "Missing birth date, excluded from age average",
            Severity::Info,
        )),
    }

    let passed = !checks
        .iter()
        .any(|c| !c.passed && c.severity == Severity::Critical);

    ProfileAudit {
        player_id: player.id.clone(),
        checks,
        passed,
    }
}

// ============================================================================
// TESTS
// ============================================================================
