//! Input validation helpers shared by the services.

use chrono::NaiveDate;
use validator::{Validate, ValidationErrors};

use crate::error::{DomainError, DomainResult};

/// Parse a numeric path identifier. Ids are positive 64-bit integers.
pub fn parse_id(raw: &str) -> DomainResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(DomainError::InvalidParameter(format!(
            "'{raw}' is not a valid id"
        ))),
    }
}

/// Every field message of a derived validation, sorted for stable output.
pub(crate) fn field_messages<T: Validate>(input: &T) -> Vec<String> {
    match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(&errors),
    }
}

/// Fail with the aggregated messages, if there are any.
pub(crate) fn ensure_valid(mut messages: Vec<String>) -> DomainResult<()> {
    if messages.is_empty() {
        return Ok(());
    }
    messages.sort();
    Err(DomainError::Validation(messages))
}

pub(crate) fn validate<T: Validate>(input: &T) -> DomainResult<()> {
    ensure_valid(field_messages(input))
}

fn flatten(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect();
    messages.sort();
    messages
}

/// E.164: a plus sign and 8 to 15 digits, no leading zero.
pub(crate) fn is_e164(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (8..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
}

pub(crate) fn is_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
        #[validate(length(max = 3, message = "code is too long"))]
        code: String,
    }

    #[test]
    fn parse_id_accepts_positive_numbers() {
        assert_eq!(parse_id("42").unwrap(), 42);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        for raw in ["abc", "", "-3", "0", "1.5", "99999999999999999999"] {
            assert!(
                matches!(parse_id(raw), Err(DomainError::InvalidParameter(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn field_errors_are_aggregated_not_fail_fast() {
        let sample = Sample {
            name: String::new(),
            code: "toolong".into(),
        };
        match validate(&sample) {
            Err(DomainError::Validation(messages)) => {
                assert_eq!(messages, vec!["code is too long", "name is required"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn phone_numbers_follow_e164() {
        assert!(is_e164("+6281234567890"));
        assert!(!is_e164("081234567890"));
        assert!(!is_e164("+62-812"));
        assert!(!is_e164("+0123456789"));
    }

    #[test]
    fn birth_dates_must_exist_on_the_calendar() {
        assert!(is_calendar_date("1999-12-31"));
        assert!(!is_calendar_date("1999-02-30"));
        assert!(!is_calendar_date("31/12/1999"));
    }
}
