//! Field-level validation, applied by callers before save/update. The
//! persistence core never validates fields itself; it only enforces key
//! presence.

use crate::error::AppError;
use chrono::{Months, NaiveDate};
use regex::Regex;

const MOBILE_PATTERN: &str = r"^[\d+]+([\s\-]*\d+){4,}$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+$";

pub fn email(value: &str) -> Result<(), AppError> {
    matches_pattern(EMAIL_PATTERN, value)
        .then_some(())
        .ok_or_else(|| AppError::Validation(format!("invalid email address: '{}'", value)))
}

pub fn mobile_number(value: &str) -> Result<(), AppError> {
    matches_pattern(MOBILE_PATTERN, value)
        .then_some(())
        .ok_or_else(|| AppError::Validation(format!("invalid mobile number: '{}'", value)))
}

/// Applicants must be between 18 and 70 years old.
pub fn date_of_birth(dob: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    let adult_cutoff = today - Months::new(18 * 12);
    let senior_cutoff = today - Months::new(70 * 12);
    if dob > today || dob > adult_cutoff {
        return Err(AppError::Validation(
            "applicant must be at least 18 years old".into(),
        ));
    }
    if dob < senior_cutoff {
        return Err(AppError::Validation(
            "applicant must be at most 70 years old".into(),
        ));
    }
    Ok(())
}

/// Monetary amounts must be strictly positive (rejects NaN as well).
pub fn monetary_value(value: f64) -> Result<(), AppError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "monetary value must be positive, got {}",
            value
        )))
    }
}

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false)
}
