//! JAPIKey format version (`ver` claim) parsing.
//!
//! The version string is `japikey-v<N>` where `N` is a positive decimal
//! integer without leading zeros and no greater than the verifier's
//! configured maximum. The digit count is checked before the integer is
//! parsed so that arbitrarily long digit strings are rejected cheaply.

use crate::error::{JapikeyError, Result};
use std::fmt;

/// Required prefix of every version string.
pub const VERSION_PREFIX: &str = "japikey-v";

/// Version emitted by this implementation when issuing tokens.
pub const CURRENT_VERSION: u32 = 1;

/// A validated token format version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    number: u32,
    canonical: String,
}

impl Version {
    /// Parse and validate a version string against `max_version`.
    ///
    /// # Errors
    ///
    /// Returns `JapikeyError::Validation` when the prefix is wrong, the
    /// numeric suffix is malformed (empty, leading zero, non-digit, too many
    /// digits), or the number is outside `1..=max_version`.
    pub fn parse(value: &str, max_version: u32) -> Result<Self> {
        if max_version == 0 {
            return Err(JapikeyError::validation("maximum version must be at least 1"));
        }

        let digits = value.strip_prefix(VERSION_PREFIX).ok_or_else(|| {
            tracing::debug!(target: "japikey.version", "Version rejected: missing prefix");
            JapikeyError::validation("invalid version format")
        })?;

        let max_digits = decimal_digits(max_version);
        if !is_bounded_positive_decimal(digits, max_digits) {
            tracing::debug!(
                target: "japikey.version",
                suffix_len = digits.len(),
                max_digits = max_digits,
                "Version rejected: malformed numeric suffix"
            );
            return Err(JapikeyError::validation("invalid version format"));
        }

        // At most ten digits reach this point, which always fits in a u64
        let number: u64 = digits
            .parse()
            .map_err(|_| JapikeyError::validation("invalid version format"))?;

        if number > u64::from(max_version) {
            tracing::debug!(
                target: "japikey.version",
                version = number,
                max_version = max_version,
                "Version rejected: exceeds maximum"
            );
            return Err(JapikeyError::validation("unsupported version"));
        }

        let number =
            u32::try_from(number).map_err(|_| JapikeyError::validation("unsupported version"))?;

        Ok(Self {
            number,
            canonical: format!("{VERSION_PREFIX}{number}"),
        })
    }

    /// The current version in canonical form.
    #[must_use]
    pub fn current() -> Self {
        Self {
            number: CURRENT_VERSION,
            canonical: format!("{VERSION_PREFIX}{CURRENT_VERSION}"),
        }
    }

    /// The numeric version.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The canonical `japikey-v<N>` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Number of decimal digits in `value` (1 for 0..=9).
fn decimal_digits(value: u32) -> usize {
    let mut digits = 1;
    let mut rest = value / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

/// Matches `[1-9][0-9]{0,max_digits-1}`.
fn is_bounded_positive_decimal(s: &str, max_digits: usize) -> bool {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b'1'..=b'9') => {}
        _ => return false,
    }
    bytes.len() <= max_digits && bytes.iter().all(u8::is_ascii_digit)
}
