//! Phone number value object.
//!
//! Payment is made out-of-band to a mobile-money account, so the phone
//! number a subscriber registers with is what the reviewer matches the
//! payment against. Three input shapes are accepted and all normalize
//! to one canonical international representation.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country calling code of the deployment.
const COUNTRY_CODE: &str = "251";

/// Length of the national significant number (after the leading zero).
const NATIONAL_DIGITS: usize = 9;

/// A validated phone number in canonical international form (`+251…`).
///
/// Accepted input shapes:
/// - local leading-zero form: `0911223344`
/// - international with `+`: `+251911223344`
/// - international without `+`: `251911223344`
///
/// All three normalize to `+251911223344`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses and normalizes a raw phone string.
    ///
    /// Leading and trailing whitespace is tolerated; anything else that
    /// does not match one of the three accepted shapes is rejected.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }

        let national = if let Some(rest) = trimmed.strip_prefix('0') {
            rest
        } else if let Some(rest) = trimmed.strip_prefix('+') {
            match rest.strip_prefix(COUNTRY_CODE) {
                Some(national) => national,
                None => {
                    return Err(ValidationError::invalid_format(
                        "phone",
                        format!("expected country code +{}", COUNTRY_CODE),
                    ))
                }
            }
        } else if let Some(rest) = trimmed.strip_prefix(COUNTRY_CODE) {
            rest
        } else {
            return Err(ValidationError::invalid_format(
                "phone",
                "expected a leading 0 or the international country code",
            ));
        };

        if national.len() != NATIONAL_DIGITS || !national.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_format(
                "phone",
                format!("expected {} digits after the prefix", NATIONAL_DIGITS),
            ));
        }

        Ok(Self(format!("+{}{}", COUNTRY_CODE, national)))
    }

    /// Returns the canonical international representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
