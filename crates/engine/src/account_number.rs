//! Bank-code-qualified account numbers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Globally unique account number with an embedded bank code.
///
/// The number is IBAN-shaped: two uppercase letters (country), two check
/// digits, four uppercase letters (the **bank code**) and ten digits, e.g.
/// `NL64KRCH0000000001`. The bank code drives the locality rule: transfers
/// are only permitted between accounts sharing the same bank code.
///
/// ```rust
/// use engine::AccountNumber;
///
/// let number = AccountNumber::parse("NL64KRCH0000000001").unwrap();
/// assert_eq!(number.bank_code(), "KRCH");
/// assert!(AccountNumber::parse("not-a-number").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

const COUNTRY_LEN: usize = 2;
const CHECK_LEN: usize = 2;
const BANK_CODE_LEN: usize = 4;
const DIGITS_LEN: usize = 10;
const TOTAL_LEN: usize = COUNTRY_LEN + CHECK_LEN + BANK_CODE_LEN + DIGITS_LEN;

impl AccountNumber {
    /// Validates and wraps a raw account number.
    pub fn parse(value: &str) -> Result<Self, EngineError> {
        let value = value.trim();
        if value.len() != TOTAL_LEN || !value.is_ascii() {
            return Err(EngineError::InvalidTransaction(format!(
                "invalid account number: {value}"
            )));
        }

        let bytes = value.as_bytes();
        let country_ok = bytes[..COUNTRY_LEN].iter().all(u8::is_ascii_uppercase);
        let check_ok = bytes[COUNTRY_LEN..COUNTRY_LEN + CHECK_LEN]
            .iter()
            .all(u8::is_ascii_digit);
        let bank_ok = bytes[COUNTRY_LEN + CHECK_LEN..COUNTRY_LEN + CHECK_LEN + BANK_CODE_LEN]
            .iter()
            .all(u8::is_ascii_uppercase);
        let digits_ok = bytes[TOTAL_LEN - DIGITS_LEN..].iter().all(u8::is_ascii_digit);

        if !(country_ok && check_ok && bank_ok && digits_ok) {
            return Err(EngineError::InvalidTransaction(format!(
                "invalid account number: {value}"
            )));
        }

        Ok(Self(value.to_string()))
    }

    /// The raw account number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four-letter bank code embedded in the number.
    #[must_use]
    pub fn bank_code(&self) -> &str {
        &self.0[COUNTRY_LEN + CHECK_LEN..COUNTRY_LEN + CHECK_LEN + BANK_CODE_LEN]
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_numbers() {
        let number = AccountNumber::parse("NL64KRCH0000000001").unwrap();
        assert_eq!(number.as_str(), "NL64KRCH0000000001");
        assert_eq!(number.bank_code(), "KRCH");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let number = AccountNumber::parse(" NL64KRCH0000000001 ").unwrap();
        assert_eq!(number.as_str(), "NL64KRCH0000000001");
    }

    #[test]
    fn rejects_malformed_numbers() {
        for raw in [
            "",
            "NL64KRCH",
            "nl64KRCH0000000001",
            "NL64krch0000000001",
            "NLxxKRCH0000000001",
            "NL64KRCH00000000012",
            "NL64KRCH00000000ab",
        ] {
            assert!(AccountNumber::parse(raw).is_err(), "accepted {raw:?}");
        }
    }
}
