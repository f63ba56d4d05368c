// ABOUTME: Short message model decoded from deliver_sm/submit_sm bodies
// ABOUTME: Splits long messages into concatenated segments using SAR TLVs, UDH or a payload TLV

use crate::codec::{CodecError, Pdu};
use crate::datatypes::{
    CommandId, DataCoding, EsmClass, NumericPlanIndicator, PriorityFlag, SmppAddress, Tlv, TlvTag,
    TypeOfNumber, find_tlv,
};

/// GSM 03.38 escape to the extension table; the next septet belongs to it.
const GSM_ESCAPE: u8 = 0x1B;

/// Size of the concatenation user data header written for 8-bit references.
pub const UDH_LEN: usize = 6;

/// Most segments a concatenated message can have; the counters are one octet.
pub const MAX_SEGMENTS: usize = 255;

/// A short message as carried by DELIVER_SM or SUBMIT_SM.
///
/// `Clone` is deep: every TLV owns its bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sms {
    pub service_type: String,
    pub source: SmppAddress,
    pub destination: SmppAddress,
    pub esm_class: EsmClass,
    pub protocol_id: u8,
    pub priority_flag: PriorityFlag,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub short_message: Vec<u8>,
    pub tlvs: Vec<Tlv>,
    /// Set only on the sentinel returned when no message is available.
    pub is_null: bool,
}

impl Sms {
    /// The "no message" sentinel.
    pub fn null() -> Self {
        Sms {
            is_null: true,
            ..Sms::default()
        }
    }

    /// Decodes the fixed fields in protocol order, then every trailing TLV.
    pub fn from_pdu(pdu: &Pdu) -> Result<Self, CodecError> {
        if !matches!(pdu.command_id, CommandId::DeliverSm | CommandId::SubmitSm) {
            return Err(CodecError::Corrupt {
                field: "command_id",
                reason: format!("{:?} does not carry a short message", pdu.command_id),
            });
        }

        let mut pdu = pdu.clone();
        pdu.reset_cursor();

        let service_type = pdu.read_cstring("service_type")?;
        let source_ton = TypeOfNumber::from(pdu.read_u8("source_addr_ton")?);
        let source_npi = NumericPlanIndicator::from(pdu.read_u8("source_addr_npi")?);
        let source_addr = pdu.read_cstring("source_addr")?;
        let dest_ton = TypeOfNumber::from(pdu.read_u8("dest_addr_ton")?);
        let dest_npi = NumericPlanIndicator::from(pdu.read_u8("dest_addr_npi")?);
        let dest_addr = pdu.read_cstring("destination_addr")?;
        let esm_class = EsmClass(pdu.read_u8("esm_class")?);
        let protocol_id = pdu.read_u8("protocol_id")?;
        let priority_flag = PriorityFlag::from(pdu.read_u8("priority_flag")?);
        let schedule_delivery_time = pdu.read_cstring("schedule_delivery_time")?;
        let validity_period = pdu.read_cstring("validity_period")?;
        let registered_delivery = pdu.read_u8("registered_delivery")?;
        let replace_if_present_flag = pdu.read_u8("replace_if_present_flag")?;
        let data_coding = DataCoding::from_byte(pdu.read_u8("data_coding")?);
        let sm_default_msg_id = pdu.read_u8("sm_default_msg_id")?;
        let sm_length = pdu.read_u8("sm_length")? as usize;
        let short_message = pdu.read_octets("short_message", sm_length)?;
        let tlvs = pdu.read_tlvs()?;

        Ok(Sms {
            service_type,
            source: SmppAddress::from_wire(source_addr, source_ton, source_npi),
            destination: SmppAddress::from_wire(dest_addr, dest_ton, dest_npi),
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            short_message,
            tlvs,
            is_null: false,
        })
    }

    pub fn is_delivery_receipt(&self) -> bool {
        self.esm_class.is_delivery_receipt()
    }

    pub fn tlv(&self, tag: TlvTag) -> Option<&Tlv> {
        find_tlv(&self.tlvs, tag)
    }

    /// Message body: `short_message`, or the MESSAGE_PAYLOAD TLV when the
    /// short message is empty.
    pub fn message(&self) -> &[u8] {
        if self.short_message.is_empty() {
            if let Some(payload) = self.tlv(TlvTag::MessagePayload) {
                return &payload.value;
            }
        }
        &self.short_message
    }
}

/// How a message too long for one SUBMIT_SM is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsmsMethod {
    /// Whole message in a MESSAGE_PAYLOAD TLV, one PDU.
    Payload,
    /// SAR_MSG_REF_NUM / SAR_TOTAL_SEGMENTS / SAR_SEGMENT_SEQNUM TLVs per segment.
    #[default]
    SixteenBitTags,
    /// Six octet concatenation UDH at the start of each short_message.
    EightBitUdh,
}

/// Where a chunk may end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Boundary {
    /// One octet per unit; a chunk never ends on the GSM escape octet.
    Octet,
    /// Two octet UCS-2 units; a chunk never ends inside a unit or a surrogate pair.
    Ucs2,
}

impl Boundary {
    pub fn for_coding(coding: DataCoding) -> Self {
        if coding.is_unicode() {
            Boundary::Ucs2
        } else {
            Boundary::Octet
        }
    }
}

/// One SUBMIT_SM worth of a split message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub short_message: Vec<u8>,
    pub tlvs: Vec<Tlv>,
    /// `short_message` starts with a user data header.
    pub udhi: bool,
}

impl Segment {
    fn plain(short_message: Vec<u8>) -> Self {
        Segment {
            short_message,
            tlvs: Vec::new(),
            udhi: false,
        }
    }
}

/// Splits `message` for sending.
///
/// A message that fits in `max_segment_len` becomes a single plain segment
/// whatever the method. `reference` ties the parts together; only its low
/// octet is used for 8-bit UDH.
pub fn split(
    message: &[u8],
    method: CsmsMethod,
    max_segment_len: usize,
    reference: u16,
) -> Result<Vec<Segment>, CodecError> {
    split_with(message, method, max_segment_len, reference, Boundary::Octet)
}

pub fn split_with(
    message: &[u8],
    method: CsmsMethod,
    max_segment_len: usize,
    reference: u16,
    boundary: Boundary,
) -> Result<Vec<Segment>, CodecError> {
    if message.len() <= max_segment_len {
        return Ok(vec![Segment::plain(message.to_vec())]);
    }

    match method {
        CsmsMethod::Payload => Ok(vec![Segment {
            short_message: Vec::new(),
            tlvs: vec![Tlv::new(TlvTag::MessagePayload, message)],
            udhi: false,
        }]),
        CsmsMethod::SixteenBitTags => {
            let parts = chunk(message, max_segment_len, boundary)?;
            let total = parts.len() as u8;
            Ok(parts
                .into_iter()
                .enumerate()
                .map(|(i, part)| Segment {
                    short_message: part.to_vec(),
                    tlvs: vec![
                        Tlv::u16(TlvTag::SarMsgRefNum, reference),
                        Tlv::u8(TlvTag::SarTotalSegments, total),
                        Tlv::u8(TlvTag::SarSegmentSeqnum, i as u8 + 1),
                    ],
                    udhi: false,
                })
                .collect())
        }
        CsmsMethod::EightBitUdh => {
            let room = max_segment_len.saturating_sub(UDH_LEN);
            let parts = chunk(message, room, boundary)?;
            let total = parts.len() as u8;
            Ok(parts
                .into_iter()
                .enumerate()
                .map(|(i, part)| {
                    let mut short_message = Vec::with_capacity(UDH_LEN + part.len());
                    short_message.extend_from_slice(&[
                        0x05,
                        0x00,
                        0x03,
                        reference as u8,
                        total,
                        i as u8 + 1,
                    ]);
                    short_message.extend_from_slice(part);
                    Segment {
                        short_message,
                        tlvs: Vec::new(),
                        udhi: true,
                    }
                })
                .collect())
        }
    }
}

fn chunk(message: &[u8], len: usize, boundary: Boundary) -> Result<Vec<&[u8]>, CodecError> {
    let min = match boundary {
        Boundary::Octet => 2,
        Boundary::Ucs2 => 4,
    };
    if len < min {
        return Err(CodecError::Corrupt {
            field: "short_message",
            reason: format!("segment length {len} leaves no room for text"),
        });
    }

    let mut parts = Vec::new();
    let mut rest = message;
    while !rest.is_empty() {
        let mut end = rest.len().min(len);
        if end < rest.len() {
            match boundary {
                Boundary::Octet => {
                    if rest[end - 1] == GSM_ESCAPE {
                        end -= 1;
                    }
                }
                Boundary::Ucs2 => {
                    end -= end % 2;
                    if (0xD8..=0xDB).contains(&rest[end - 2]) {
                        end -= 2;
                    }
                }
            }
        }
        let (part, tail) = rest.split_at(end);
        parts.push(part);
        rest = tail;
    }

    if parts.len() > MAX_SEGMENTS {
        return Err(CodecError::FieldTooLong {
            field: "short_message",
            max: MAX_SEGMENTS * len,
            actual: message.len(),
        });
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Captured DELIVER_SM: source 4526159917, destination "default", one
    // MESSAGE_STATE TLV.
    const SHORT_DELIVER_SM: [u8; 57] = [
        0x00, 0x00, 0x00, 57, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x01, 0x34, 0x35, 0x32, 0x36, 0x31, 0x35, 0x39, 0x39, 0x31, 0x37, 0x00,
        0x05, 0x00, 0x64, 0x65, 0x66, 0x61, 0x75, 0x6c, 0x74, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x03, 0x00, 0x02, 0x69, 0x00, 0x04, 0x27, 0x00, 0x01, 0x02,
    ];

    fn sms_with_two_tlvs() -> Sms {
        let mut frame = SHORT_DELIVER_SM.to_vec();
        frame.extend_from_slice(&[0x00, 0x1E, 0x00, 0x04, b'a', b'b', b'c', 0x00]);
        let len = frame.len() as u32;
        frame[0..4].copy_from_slice(&len.to_be_bytes());
        Sms::from_pdu(&Pdu::from_bytes(&frame).unwrap()).unwrap()
    }

    #[test]
    fn decodes_fixed_fields_and_tlvs() {
        let pdu = Pdu::from_bytes(&SHORT_DELIVER_SM).unwrap();
        let sms = Sms::from_pdu(&pdu).unwrap();

        assert!(!sms.is_null);
        assert_eq!(sms.source.as_str(), "4526159917");
        assert_eq!(sms.source.ton, TypeOfNumber::International);
        assert_eq!(sms.source.npi, NumericPlanIndicator::Isdn);
        assert_eq!(sms.destination.as_str(), "default");
        assert_eq!(sms.destination.ton, TypeOfNumber::Alphanumeric);
        assert!(sms.is_delivery_receipt());
        assert_eq!(sms.data_coding, DataCoding::Latin1);
        assert_eq!(sms.short_message, b"i\0");
        assert_eq!(sms.tlvs, vec![Tlv::u8(TlvTag::MessageState, 2)]);
    }

    #[test]
    fn clone_owns_its_tlv_storage() {
        let original = sms_with_two_tlvs();
        let mut copy = original.clone();

        assert_eq!(copy.tlvs.len(), 2);
        assert_eq!(copy.tlvs, original.tlvs);
        for (a, b) in original.tlvs.iter().zip(&copy.tlvs) {
            assert_ne!(a.value.as_ptr(), b.value.as_ptr());
        }

        copy.tlvs[1].value[0] = b'z';
        assert_eq!(original.tlvs[1].value_cstring(), Some("abc"));
    }

    #[test]
    fn short_body_is_an_error_not_a_null_sms() {
        let mut frame = SHORT_DELIVER_SM[..30].to_vec();
        frame[0..4].copy_from_slice(&30u32.to_be_bytes());
        let err = Sms::from_pdu(&Pdu::from_bytes(&frame).unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::Corrupt { field: "dest_addr_ton", .. }));
    }

    #[test]
    fn rejects_pdus_without_a_message() {
        let pdu = Pdu::new(CommandId::EnquireLink, 1);
        assert!(Sms::from_pdu(&pdu).is_err());
    }

    #[test]
    fn message_falls_back_to_payload() {
        let sms = Sms {
            tlvs: vec![Tlv::new(TlvTag::MessagePayload, b"long text".to_vec())],
            ..Sms::default()
        };
        assert_eq!(sms.message(), b"long text");
        assert!(Sms::null().is_null);
    }

    #[test]
    fn sixteen_bit_tags_split() {
        let message: Vec<u8> = (0..450).map(|i| b'a' + (i % 26) as u8).collect();
        let segments = split(&message, CsmsMethod::SixteenBitTags, 153, 0x0102).unwrap();

        assert_eq!(segments.len(), 3);
        let joined: Vec<u8> = segments
            .iter()
            .flat_map(|s| s.short_message.clone())
            .collect();
        assert_eq!(joined, message);

        for (i, segment) in segments.iter().enumerate() {
            assert!(segment.short_message.len() <= 153);
            assert!(!segment.udhi);
            assert_eq!(
                segment.tlvs,
                vec![
                    Tlv::u16(TlvTag::SarMsgRefNum, 0x0102),
                    Tlv::u8(TlvTag::SarTotalSegments, 3),
                    Tlv::u8(TlvTag::SarSegmentSeqnum, i as u8 + 1),
                ]
            );
        }
    }

    #[test]
    fn udh_split_prefixes_each_part() {
        let message = vec![b'x'; 300];
        let segments = split(&message, CsmsMethod::EightBitUdh, 152, 0x01AB).unwrap();

        assert_eq!(segments.len(), 3);
        assert_eq!(&segments[0].short_message[..6], &[0x05, 0x00, 0x03, 0xAB, 3, 1]);
        assert_eq!(&segments[2].short_message[..6], &[0x05, 0x00, 0x03, 0xAB, 3, 3]);
        assert!(segments.iter().all(|s| s.udhi && s.short_message.len() <= 152));
        let text: usize = segments.iter().map(|s| s.short_message.len() - UDH_LEN).sum();
        assert_eq!(text, 300);
    }

    #[test]
    fn payload_method_keeps_one_pdu() {
        let message = vec![b'y'; 400];
        let segments = split(&message, CsmsMethod::Payload, 152, 1).unwrap();

        assert_eq!(segments.len(), 1);
        assert!(segments[0].short_message.is_empty());
        assert_eq!(segments[0].tlvs, vec![Tlv::new(TlvTag::MessagePayload, message)]);
    }

    #[test]
    fn short_message_is_not_segmented() {
        let segments = split(b"hello", CsmsMethod::SixteenBitTags, 152, 9).unwrap();
        assert_eq!(segments, vec![Segment::plain(b"hello".to_vec())]);
    }

    #[test]
    fn escape_is_not_left_dangling() {
        let mut message = vec![b'a'; 9];
        message.push(GSM_ESCAPE);
        message.push(0x65);
        message.extend_from_slice(&[b'b'; 5]);

        let segments = split(&message, CsmsMethod::SixteenBitTags, 10, 1).unwrap();
        assert_eq!(segments[0].short_message.len(), 9);
        assert_eq!(&segments[1].short_message[..2], &[GSM_ESCAPE, 0x65]);
    }

    #[test]
    fn ucs2_split_keeps_surrogate_pairs() {
        // Five BMP units then a surrogate pair straddling the 12 octet mark.
        let mut message = vec![0x00, 0x41].repeat(5);
        message.extend_from_slice(&[0xD8, 0x3D, 0xDE, 0x00]);
        message.extend_from_slice(&[0x00, 0x42].repeat(4));

        let segments = split_with(
            &message,
            CsmsMethod::SixteenBitTags,
            12,
            1,
            Boundary::Ucs2,
        )
        .unwrap();
        assert_eq!(segments[0].short_message.len(), 10);
        assert_eq!(&segments[1].short_message[..2], &[0xD8, 0x3D]);
    }

    #[test]
    fn too_many_segments_is_rejected() {
        let message = vec![b'z'; 256 * 10];
        assert!(matches!(
            split(&message, CsmsMethod::SixteenBitTags, 10, 1),
            Err(CodecError::FieldTooLong { .. })
        ));
    }
}
