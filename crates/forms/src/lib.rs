//! hrdeck forms: declarative validation rule tables.
//!
//! One table per form (field, check, message), evaluated uniformly instead of
//! scattering ad-hoc checks through every create command.

#![forbid(unsafe_code)]

use hrdeck_core::{parse_date_ts, Record};

/// A check receives the field's value (absent fields get `None`).
pub type Check = fn(Option<&serde_json::Value>) -> bool;

pub struct Rule {
    pub field: &'static str,
    pub check: Check,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Evaluate a rule table against a record. Empty result means valid.
pub fn validate(rules: &[Rule], values: &Record) -> Vec<Violation> {
    rules
        .iter()
        .filter(|r| !(r.check)(values.get(r.field)))
        .map(|r| Violation {
            field: r.field,
            message: r.message,
        })
        .collect()
}

// ---------------- checks ----------------

fn as_str(v: Option<&serde_json::Value>) -> Option<&str> {
    v.and_then(|v| v.as_str())
}

pub fn present(v: Option<&serde_json::Value>) -> bool {
    match v {
        Some(serde_json::Value::String(s)) => !s.trim().is_empty(),
        Some(serde_json::Value::Null) | None => false,
        Some(_) => true,
    }
}

pub fn email(v: Option<&serde_json::Value>) -> bool {
    let Some(s) = as_str(v) else { return false };
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

pub fn phone(v: Option<&serde_json::Value>) -> bool {
    let Some(s) = as_str(v) else { return false };
    let digits = s.chars().filter(|c| c.is_ascii_digit()).count();
    digits >= 10 && s.chars().all(|c| c.is_ascii_digit() || "+ -()".contains(c))
}

pub fn date(v: Option<&serde_json::Value>) -> bool {
    as_str(v).and_then(parse_date_ts).is_some()
}

pub fn positive_amount(v: Option<&serde_json::Value>) -> bool {
    let n = match v {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    matches!(n, Some(n) if n > 0.0)
}

/// An address must not be purely numeric.
pub fn non_numeric_address(v: Option<&serde_json::Value>) -> bool {
    let Some(s) = as_str(v) else { return false };
    !s.trim().is_empty() && !s.trim().chars().all(|c| c.is_ascii_digit())
}

/// Turkish national identity number: 11 digits, leading digit nonzero, not
/// one digit repeated, and both checksum digits consistent.
pub fn national_id(v: Option<&serde_json::Value>) -> bool {
    let Some(s) = as_str(v) else { return false };
    if s.len() != 11 || !s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let d: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    if d[0] == 0 || d.iter().all(|&x| x == d[0]) {
        return false;
    }
    let odd: u32 = d[0] + d[2] + d[4] + d[6] + d[8];
    let even: u32 = d[1] + d[3] + d[5] + d[7];
    let Some(check10) = (odd * 7).checked_sub(even) else {
        return false;
    };
    if check10 % 10 != d[9] {
        return false;
    }
    let sum10: u32 = d[..10].iter().sum();
    sum10 % 10 == d[10]
}

/// At least 6 characters with upper, lower, digit and a special character.
pub fn password_meets_policy(password: &str) -> bool {
    password.len() >= 6
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric())
}

/// Cross-field password change validation (policy + repeat match).
pub fn validate_password_change(password: &str, repeat: &str) -> Result<(), &'static str> {
    if password.is_empty() || repeat.is_empty() {
        return Err("password and repeat are required");
    }
    if password != repeat {
        return Err("passwords do not match");
    }
    if !password_meets_policy(password) {
        return Err(
            "password needs at least 6 characters with upper, lower, digit and special characters",
        );
    }
    Ok(())
}

// ---------------- rule tables ----------------

/// Employee create form. secondName/secondSurname are deliberately optional.
pub fn employee_create_rules() -> &'static [Rule] {
    const RULES: &[Rule] = &[
        Rule { field: "firstName", check: present, message: "first name is required" },
        Rule { field: "firstSurname", check: present, message: "surname is required" },
        Rule { field: "phoneNumber", check: phone, message: "a valid phone number is required" },
        Rule { field: "dateOfBirth", check: date, message: "date of birth must be a valid date" },
        Rule { field: "birthPlace", check: present, message: "birth place is required" },
        Rule { field: "tc", check: national_id, message: "national id number is invalid" },
        Rule { field: "address", check: non_numeric_address, message: "address must not be purely numeric" },
        Rule { field: "company", check: present, message: "company is required" },
        Rule { field: "department", check: present, message: "department is required" },
        Rule { field: "position", check: present, message: "position is required" },
        Rule { field: "startDate", check: date, message: "start date must be a valid date" },
        Rule { field: "wage", check: positive_amount, message: "wage must be a positive amount" },
        Rule { field: "email", check: email, message: "a valid email is required" },
        Rule { field: "gender", check: present, message: "gender is required" },
    ];
    RULES
}

pub fn permission_request_rules() -> &'static [Rule] {
    const RULES: &[Rule] = &[
        Rule { field: "permissionType", check: present, message: "permission type is required" },
        Rule { field: "startDate", check: date, message: "start date must be a valid date" },
        Rule { field: "endDate", check: date, message: "end date must be a valid date" },
    ];
    RULES
}

pub fn advance_request_rules() -> &'static [Rule] {
    const RULES: &[Rule] = &[
        Rule { field: "advanceType", check: present, message: "advance type is required" },
        Rule { field: "amount", check: positive_amount, message: "amount must be positive" },
        Rule { field: "currency", check: present, message: "currency is required" },
    ];
    RULES
}

pub fn expense_claim_rules() -> &'static [Rule] {
    const RULES: &[Rule] = &[
        Rule { field: "expenseType", check: present, message: "expense type is required" },
        Rule { field: "amount", check: positive_amount, message: "amount must be positive" },
        Rule { field: "currency", check: present, message: "currency is required" },
    ];
    RULES
}
