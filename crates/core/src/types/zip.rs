//! US ZIP code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ZipCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipCodeError {
    /// The input string is empty.
    #[error("ZIP code cannot be empty")]
    Empty,
    /// The input is not five characters long.
    #[error("ZIP code must be exactly 5 digits, got {len} characters")]
    InvalidLength {
        /// Length of the rejected input.
        len: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("ZIP code must contain only digits: {0:?}")]
    NonDigit(String),
    /// The ZIP+4 extension is malformed.
    #[error("invalid ZIP+4 extension: {0:?}")]
    InvalidExtension(String),
}

/// A five-digit US ZIP code.
///
/// ZIP codes are compared and ordered as strings, so `"01001" < "10001"`.
///
/// ## Constraints
///
/// - Exactly 5 ASCII digits
/// - Leading zeros are significant and preserved
///
/// ## Examples
///
/// ```
/// use hausbaum_core::ZipCode;
///
/// assert!(ZipCode::parse("33131").is_ok());
/// assert!(ZipCode::parse("02134").is_ok());
///
/// assert!(ZipCode::parse("").is_err());
/// assert!(ZipCode::parse("3313").is_err());
/// assert!(ZipCode::parse("3313a").is_err());
///
/// // User input may carry whitespace or a ZIP+4 suffix.
/// let zip = ZipCode::normalize(" 44718-1234 ").unwrap();
/// assert_eq!(zip.as_str(), "44718");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZipCode(String);

impl ZipCode {
    /// Number of digits in a ZIP code.
    pub const LENGTH: usize = 5;

    /// Parse a strict five-digit `ZipCode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not five characters long,
    /// or contains a non-digit.
    pub fn parse(s: &str) -> Result<Self, ZipCodeError> {
        if s.is_empty() {
            return Err(ZipCodeError::Empty);
        }

        if s.len() != Self::LENGTH {
            return Err(ZipCodeError::InvalidLength { len: s.len() });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZipCodeError::NonDigit(s.to_owned()));
        }

        Ok(Self(s.to_owned()))
    }

    /// Parse user-entered input into a `ZipCode`.
    ///
    /// Surrounding whitespace is trimmed and the `12345-6789` ZIP+4 form is
    /// reduced to its first five digits.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is not a valid ZIP or ZIP+4.
    pub fn normalize(s: &str) -> Result<Self, ZipCodeError> {
        let trimmed = s.trim();

        match trimmed.split_once('-') {
            Some((zip, extension)) => {
                if extension.len() != 4 || !extension.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ZipCodeError::InvalidExtension(extension.to_owned()));
                }
                Self::parse(zip)
            }
            None => Self::parse(trimmed),
        }
    }

    /// Returns the ZIP code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ZipCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ZipCode {
    type Err = ZipCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ZipCode {
    type Error = ZipCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZipCode> for String {
    fn from(zip: ZipCode) -> Self {
        zip.0
    }
}

impl AsRef<str> for ZipCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(ZipCode::parse("33131").is_ok());
        assert!(ZipCode::parse("00501").is_ok());
        assert!(ZipCode::parse("99950").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ZipCode::parse(""), Err(ZipCodeError::Empty));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            ZipCode::parse("1234"),
            Err(ZipCodeError::InvalidLength { len: 4 })
        );
        assert_eq!(
            ZipCode::parse("123456"),
            Err(ZipCodeError::InvalidLength { len: 6 })
        );
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            ZipCode::parse("12a45"),
            Err(ZipCodeError::NonDigit(_))
        ));
        // Five bytes but not five ASCII digits
        assert!(ZipCode::parse("１２３").is_err());
    }

    #[test]
    fn test_parse_is_strict_about_whitespace() {
        assert!(ZipCode::parse(" 3313").is_err());
        assert!(ZipCode::parse("33131 ").is_err());
    }

    #[test]
    fn test_normalize_trims_and_strips_extension() {
        assert_eq!(ZipCode::normalize(" 44718 ").unwrap().as_str(), "44718");
        assert_eq!(ZipCode::normalize("44718-0001").unwrap().as_str(), "44718");
    }

    #[test]
    fn test_normalize_rejects_bad_extension() {
        assert!(matches!(
            ZipCode::normalize("44718-01"),
            Err(ZipCodeError::InvalidExtension(_))
        ));
        assert!(ZipCode::normalize("44718-abcd").is_err());
        assert!(ZipCode::normalize("4471-8000").is_err());
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let zip = ZipCode::parse("02134").unwrap();
        assert_eq!(zip.to_string(), "02134");
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = ZipCode::parse("01001").unwrap();
        let b = ZipCode::parse("10001").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let zip = ZipCode::parse("33131").unwrap();
        let json = serde_json::to_string(&zip).unwrap();
        assert_eq!(json, "\"33131\"");
        assert_eq!(serde_json::from_str::<ZipCode>(&json).unwrap(), zip);

        assert!(serde_json::from_str::<ZipCode>("\"3313x\"").is_err());
    }
}
