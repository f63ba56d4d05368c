// ABOUTME: SMPP esm_class bitfield exposing message mode, type and feature bits
// ABOUTME: Stored as the raw octet so unknown combinations survive decode and encode

use std::fmt;

/// The `esm_class` octet (Section 5.2.12).
///
/// Bits 1-0 carry the messaging mode, bits 5-2 the message type and bits
/// 7-6 the GSM network features.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EsmClass(pub u8);

impl EsmClass {
    pub const DEFAULT: EsmClass = EsmClass(0x00);
    pub const DATAGRAM_MODE: u8 = 0x01;
    pub const FORWARD_MODE: u8 = 0x02;
    pub const STORE_AND_FORWARD_MODE: u8 = 0x03;

    /// Message type bit set by the SMSC on delivery receipts.
    pub const DELIVERY_RECEIPT: u8 = 0x04;
    pub const DELIVERY_ACK: u8 = 0x08;
    pub const USER_ACK: u8 = 0x10;
    pub const INTERMEDIATE_NOTIFICATION: u8 = 0x20;

    /// User Data Header Indicator: short_message starts with a UDH.
    pub const UDHI: u8 = 0x40;
    pub const REPLY_PATH: u8 = 0x80;

    const MODE_MASK: u8 = 0x03;
    const TYPE_MASK: u8 = 0x3C;

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn mode(&self) -> u8 {
        self.0 & Self::MODE_MASK
    }

    pub fn message_type(&self) -> u8 {
        self.0 & Self::TYPE_MASK
    }

    pub fn is_delivery_receipt(&self) -> bool {
        self.message_type() == Self::DELIVERY_RECEIPT
    }

    pub fn has_udhi(&self) -> bool {
        self.0 & Self::UDHI != 0
    }

    pub fn with_udhi(self) -> Self {
        EsmClass(self.0 | Self::UDHI)
    }

    pub fn with_reply_path(self) -> Self {
        EsmClass(self.0 | Self::REPLY_PATH)
    }
}

impl From<u8> for EsmClass {
    fn from(value: u8) -> Self {
        EsmClass(value)
    }
}

impl From<EsmClass> for u8 {
    fn from(value: EsmClass) -> Self {
        value.0
    }
}

impl fmt::Debug for EsmClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EsmClass({:#04x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_receipt_detection_ignores_other_bits() {
        assert!(EsmClass(0x04).is_delivery_receipt());
        assert!(EsmClass(0x44).is_delivery_receipt());
        assert!(!EsmClass(0x08).is_delivery_receipt());
        assert!(!EsmClass::DEFAULT.is_delivery_receipt());
    }

    #[test]
    fn udhi_flag() {
        let esm = EsmClass::DEFAULT.with_udhi();
        assert_eq!(esm.bits(), 0x40);
        assert!(esm.has_udhi());
        assert_eq!(EsmClass(0x03).with_udhi().mode(), 0x03);
    }
}
