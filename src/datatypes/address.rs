// ABOUTME: SME address triple (value, TON, NPI) used for source and destination fields
// ABOUTME: Outbound addresses are validated against the 21 octet C-string limit

use crate::datatypes::{NumericPlanIndicator, TypeOfNumber};
use std::fmt;
use thiserror::Error;

/// Longest address value; the wire field is 21 octets including the NUL.
pub const MAX_ADDRESS_LEN: usize = 20;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SmppAddress {
    pub value: String,
    pub ton: TypeOfNumber,
    pub npi: NumericPlanIndicator,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address too long: {actual_len} bytes (max {max_len})")]
    TooLong { max_len: usize, actual_len: usize },
    #[error("Address must be ASCII without NUL: {0:?}")]
    InvalidCharacters(String),
}

impl SmppAddress {
    pub fn new(
        value: impl Into<String>,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
    ) -> Result<Self, AddressError> {
        let value = value.into();
        if value.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong {
                max_len: MAX_ADDRESS_LEN,
                actual_len: value.len(),
            });
        }
        if !value.bytes().all(|b| b.is_ascii() && b != 0) {
            return Err(AddressError::InvalidCharacters(value));
        }
        Ok(Self { value, ton, npi })
    }

    /// Address as received from the SMSC. Inbound values are not re-validated.
    pub(crate) fn from_wire(value: String, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        Self { value, ton, npi }
    }

    pub fn international(value: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(
            value,
            TypeOfNumber::International,
            NumericPlanIndicator::Isdn,
        )
    }

    pub fn alphanumeric(value: impl Into<String>) -> Result<Self, AddressError> {
        Self::new(
            value,
            TypeOfNumber::Alphanumeric,
            NumericPlanIndicator::Unknown,
        )
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SmppAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}/{:?})", self.value, self.ton, self.npi)
    }
}

impl fmt::Display for SmppAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_twenty_octets() {
        let addr = SmppAddress::new(
            "12345678901234567890",
            TypeOfNumber::International,
            NumericPlanIndicator::Isdn,
        )
        .unwrap();
        assert_eq!(addr.as_str().len(), MAX_ADDRESS_LEN);
    }

    #[test]
    fn rejects_long_address() {
        let result = SmppAddress::international("123456789012345678901");
        assert_eq!(
            result,
            Err(AddressError::TooLong {
                max_len: 20,
                actual_len: 21
            })
        );
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(matches!(
            SmppAddress::alphanumeric("Café"),
            Err(AddressError::InvalidCharacters(_))
        ));
        assert!(SmppAddress::alphanumeric("a\0b").is_err());
    }

    #[test]
    fn display_is_bare_value() {
        let addr = SmppAddress::alphanumeric("INFO").unwrap();
        assert_eq!(addr.to_string(), "INFO");
        assert_eq!(addr.ton, TypeOfNumber::Alphanumeric);
    }
}
