// ABOUTME: Defines the SMPP v3.4 Numbering Plan Indicator (NPI) address parameter
// ABOUTME: Reserved values decode to a raw variant instead of failing

use num_enum::{FromPrimitive, IntoPrimitive};

/// Numbering Plan Indicator used in SME addresses (Section 5.2.6).
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericPlanIndicator {
    Unknown = 0b0000_0000,
    /// ISDN (E163/E164)
    Isdn = 0b0000_0001,
    /// Data (X.121)
    Data = 0b0000_0011,
    /// Telex (F.69)
    Telex = 0b0000_0100,
    /// Land Mobile (E.212)
    LandMobile = 0b0000_0110,
    National = 0b0000_1000,
    Private = 0b0000_1001,
    Ermes = 0b0000_1010,
    /// Internet (IP)
    Internet = 0b0000_1110,
    /// WAP Client Id (to be defined by WAP Forum)
    WapClientId = 0b0001_0010,
    #[num_enum(catch_all)]
    Reserved(u8),
}

impl Default for NumericPlanIndicator {
    fn default() -> Self {
        NumericPlanIndicator::Unknown
    }
}
