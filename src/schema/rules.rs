//! Field rules that a JSON Schema cannot express on its own

use chrono::NaiveDate;

/// Throwaway mailbox providers refused for business contacts
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "10minutemail.com",
    "discard.email",
    "dispostable.com",
    "fakeinbox.com",
    "getnada.com",
    "guerrillamail.com",
    "mailinator.com",
    "maildrop.cc",
    "mintemail.com",
    "sharklasers.com",
    "temp-mail.org",
    "tempmail.com",
    "throwawaymail.com",
    "trashmail.com",
    "yopmail.com",
];

/// Keep only digits and put a single `+` in front. Empty input stays empty.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        String::new()
    } else {
        format!("+{}", digits)
    }
}

/// Whether the address belongs to a denylisted provider (subdomains included)
pub fn is_disposable_email(email: &str) -> bool {
    let Some((_, domain)) = email.trim().rsplit_once('@') else {
        return false;
    };
    let domain = domain.to_lowercase();
    DISPOSABLE_DOMAINS
        .iter()
        .any(|d| domain == *d || domain.ends_with(&format!(".{}", d)))
}

/// Why a date string was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateProblem {
    Unparseable,
    InFuture,
}

/// Parse a `YYYY-MM-DD` date that may not lie after `today`
pub fn check_past_date(value: &str, today: NaiveDate) -> Result<NaiveDate, DateProblem> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DateProblem::Unparseable)?;
    if date > today {
        Err(DateProblem::InFuture)
    } else {
        Ok(date)
    }
}

/// Number of entries flagged primary
pub fn primary_count<T: crate::entities::Primary>(items: &[T]) -> usize {
    items.iter().filter(|i| i.is_primary()).count()
}
