// Validation utilities module
// Provides custom validation functions for domain-specific rules

use chrono::NaiveDate;
use validator::ValidationError;

/// Date format used across the API
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validates that a stay ends strictly after it starts
pub fn validate_stay_dates(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ValidationError> {
    if check_out <= check_in {
        let mut error = ValidationError::new("check_out_before_check_in");
        error.message = Some("La data di partenza deve essere successiva all'arrivo".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` date, ignoring surrounding whitespace
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Parses a stay from two date strings
///
/// Returns `None` when either date is malformed or the range is empty.
pub fn parse_stay(check_in: &str, check_out: &str) -> Option<(NaiveDate, NaiveDate)> {
    let check_in = parse_date(check_in)?;
    let check_out = parse_date(check_out)?;
    validate_stay_dates(check_in, check_out).ok()?;
    Some((check_in, check_out))
}

/// Returns the trimmed value when it is not blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Truncates to at most `max` characters (not bytes)
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
