// ABOUTME: Tagged optional parameters (TLVs) appended after the fixed fields of a PDU
// ABOUTME: Each TLV owns its value bytes so copies never share storage

use num_enum::{FromPrimitive, IntoPrimitive};

/// Optional parameter tags (Section 5.3.2).
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TlvTag {
    DestAddrSubunit = 0x0005,
    DestNetworkType = 0x0006,
    DestBearerType = 0x0007,
    DestTelematicsId = 0x0008,
    SourceAddrSubunit = 0x000D,
    SourceNetworkType = 0x000E,
    SourceBearerType = 0x000F,
    SourceTelematicsId = 0x0010,
    QosTimeToLive = 0x0017,
    PayloadType = 0x0019,
    AdditionalStatusInfoText = 0x001D,
    ReceiptedMessageId = 0x001E,
    MsMsgWaitFacilities = 0x0030,
    PrivacyIndicator = 0x0201,
    SourceSubaddress = 0x0202,
    DestSubaddress = 0x0203,
    UserMessageReference = 0x0204,
    UserResponseCode = 0x0205,
    SourcePort = 0x020A,
    DestinationPort = 0x020B,
    SarMsgRefNum = 0x020C,
    LanguageIndicator = 0x020D,
    SarTotalSegments = 0x020E,
    SarSegmentSeqnum = 0x020F,
    ScInterfaceVersion = 0x0210,
    CallbackNumPresInd = 0x0302,
    CallbackNumAtag = 0x0303,
    NumberOfMessages = 0x0304,
    CallbackNum = 0x0381,
    DpfResult = 0x0420,
    SetDpf = 0x0421,
    MsAvailabilityStatus = 0x0422,
    NetworkErrorCode = 0x0423,
    MessagePayload = 0x0424,
    DeliveryFailureReason = 0x0425,
    MoreMessagesToSend = 0x0426,
    MessageState = 0x0427,
    UssdServiceOp = 0x0501,
    DisplayTime = 0x1201,
    SmsSignal = 0x1203,
    MsValidity = 0x1204,
    AlertOnMessageDelivery = 0x130C,
    ItsReplyType = 0x1380,
    ItsSessionInfo = 0x1383,
    #[num_enum(catch_all)]
    Other(u16),
}

/// One optional parameter. The wire length is always `value.len()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    pub tag: TlvTag,
    pub value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: TlvTag, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    pub fn u8(tag: TlvTag, value: u8) -> Self {
        Self::new(tag, vec![value])
    }

    pub fn u16(tag: TlvTag, value: u16) -> Self {
        Self::new(tag, value.to_be_bytes().to_vec())
    }

    /// A C-string value, stored with its terminating NUL.
    pub fn cstring(tag: TlvTag, value: &str) -> Self {
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.extend_from_slice(value.as_bytes());
        bytes.push(0);
        Self::new(tag, bytes)
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Size on the wire including the tag and length fields.
    pub fn encoded_len(&self) -> usize {
        4 + self.value.len()
    }

    pub fn value_u8(&self) -> Option<u8> {
        match self.value.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    pub fn value_u16(&self) -> Option<u16> {
        match self.value.as_slice() {
            [hi, lo] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    /// The value as text, without any trailing NULs.
    pub fn value_cstring(&self) -> Option<&str> {
        let end = self
            .value
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |pos| pos + 1);
        std::str::from_utf8(&self.value[..end]).ok()
    }
}

/// First TLV carrying `tag`, in list order.
pub fn find_tlv(tlvs: &[Tlv], tag: TlvTag) -> Option<&Tlv> {
    tlvs.iter().find(|tlv| tlv.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_constructors() {
        assert_eq!(Tlv::u8(TlvTag::MessageState, 2).value, vec![2]);
        assert_eq!(
            Tlv::u16(TlvTag::SarMsgRefNum, 0x0102).value_u16(),
            Some(0x0102)
        );

        let id = Tlv::cstring(TlvTag::ReceiptedMessageId, "abc");
        assert_eq!(id.len(), 4);
        assert_eq!(id.encoded_len(), 8);
        assert_eq!(id.value_cstring(), Some("abc"));
    }

    #[test]
    fn accessors_reject_wrong_width() {
        let tlv = Tlv::new(TlvTag::SarTotalSegments, vec![1, 2]);
        assert_eq!(tlv.value_u8(), None);
        assert_eq!(tlv.value_u16(), Some(0x0102));
    }

    #[test]
    fn vendor_tags_round_trip() {
        let tag = TlvTag::from(0x1400);
        assert_eq!(tag, TlvTag::Other(0x1400));
        assert_eq!(u16::from(tag), 0x1400);
        assert_eq!(TlvTag::from(0x0427), TlvTag::MessageState);
    }

    #[test]
    fn find_returns_first_duplicate() {
        let tlvs = vec![
            Tlv::u8(TlvTag::Other(0x1500), 1),
            Tlv::u8(TlvTag::Other(0x1500), 2),
        ];
        assert_eq!(
            find_tlv(&tlvs, TlvTag::Other(0x1500)).and_then(Tlv::value_u8),
            Some(1)
        );
        assert!(find_tlv(&tlvs, TlvTag::MessagePayload).is_none());
    }
}
