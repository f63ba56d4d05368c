// ABOUTME: SMPP v3.4 PDU envelope with an explicit read cursor over an owned body buffer
// ABOUTME: Typed field writes/reads, TLV encoding and length-prefixed wire framing

use crate::datatypes::{CommandId, CommandStatus, Tlv, TlvTag};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;

/// Maximum allowed PDU size to prevent memory exhaustion attacks
pub const MAX_PDU_SIZE: u32 = 65536; // 64KB

/// Header bytes common to every PDU: length, command_id, status, sequence.
pub const HEADER_LEN: usize = 16;

/// Codec errors with enough context to tell which field failed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Corrupt PDU field '{field}': {reason}")]
    Corrupt { field: &'static str, reason: String },

    #[error("PDU length mismatch: header declares {declared} bytes, got {actual}")]
    LengthMismatch { declared: u32, actual: usize },

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Field '{field}' too long: {actual} bytes (max {max})")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Convert codec errors to the command_status sent back in a response
impl CodecError {
    pub fn to_command_status(&self) -> CommandStatus {
        match self {
            CodecError::InvalidPduLength { .. } | CodecError::LengthMismatch { .. } => {
                CommandStatus::InvalidCommandLength
            }
            CodecError::FieldTooLong {
                field: "short_message",
                ..
            } => CommandStatus::InvalidMsgLength,
            CodecError::Corrupt { field, .. } if field.starts_with("tlv") => {
                CommandStatus::InvalidOptionalParameterValue
            }
            CodecError::Corrupt {
                field: "source_addr",
                ..
            } => CommandStatus::InvalidSourceAddress,
            CodecError::Corrupt {
                field: "destination_addr",
                ..
            } => CommandStatus::InvalidDestinationAddress,
            _ => CommandStatus::SystemError,
        }
    }

    fn short(field: &'static str, wanted: usize, remaining: usize) -> Self {
        CodecError::Corrupt {
            field,
            reason: format!("need {wanted} bytes, {remaining} remaining"),
        }
    }
}

/// The fixed 16 byte header as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = HEADER_LEN;

    /// Parses the header and checks the declared length is within bounds.
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Result<Self, CodecError> {
        let word = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        let command_length = word(0);
        if command_length < HEADER_LEN as u32 || command_length > MAX_PDU_SIZE {
            return Err(CodecError::InvalidPduLength {
                length: command_length,
                min: HEADER_LEN as u32,
                max: MAX_PDU_SIZE,
            });
        }

        Ok(PduHeader {
            command_length,
            command_id: CommandId::from(word(4)),
            command_status: CommandStatus::from(word(8)),
            sequence_number: word(12),
        })
    }

    /// Number of body bytes that follow this header.
    pub fn body_len(&self) -> usize {
        self.command_length as usize - HEADER_LEN
    }
}

/// One SMPP PDU: header fields plus the encoded body.
///
/// Fields are appended to the body with the `write_*` methods in protocol
/// order and consumed with the matching `read_*` methods, which advance an
/// internal cursor. Reads never return defaults: running off the end of the
/// body or missing a C-string terminator is a `CodecError::Corrupt`.
#[derive(Clone, PartialEq, Eq)]
pub struct Pdu {
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
    body: Vec<u8>,
    position: usize,
}

impl Pdu {
    pub fn new(command_id: CommandId, sequence_number: u32) -> Self {
        Self {
            command_id,
            command_status: CommandStatus::Ok,
            sequence_number,
            body: Vec::new(),
            position: 0,
        }
    }

    pub fn with_status(mut self, status: CommandStatus) -> Self {
        self.command_status = status;
        self
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Total encoded length, header included.
    pub fn command_length(&self) -> usize {
        HEADER_LEN + self.body.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.body.len() - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    pub fn reset_cursor(&mut self) {
        self.position = 0;
    }

    pub fn write_u8(&mut self, value: u8) {
        self.body.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.body.put_u16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.body.put_u32(value);
    }

    /// Appends `value` followed by a NUL. `max_len` includes the terminator.
    pub fn write_cstring(
        &mut self,
        field: &'static str,
        value: &str,
        max_len: usize,
    ) -> Result<(), CodecError> {
        if value.len() + 1 > max_len {
            return Err(CodecError::FieldTooLong {
                field,
                max: max_len - 1,
                actual: value.len(),
            });
        }
        if value.as_bytes().contains(&0) {
            return Err(CodecError::Corrupt {
                field,
                reason: "embedded NUL".to_string(),
            });
        }
        self.body.put_slice(value.as_bytes());
        self.body.put_u8(0);
        Ok(())
    }

    pub fn write_octets(&mut self, value: &[u8]) {
        self.body.put_slice(value);
    }

    pub fn write_tlv(&mut self, tlv: &Tlv) -> Result<(), CodecError> {
        let len = u16::try_from(tlv.len()).map_err(|_| CodecError::FieldTooLong {
            field: "tlv",
            max: u16::MAX as usize,
            actual: tlv.len(),
        })?;
        self.body.put_u16(u16::from(tlv.tag));
        self.body.put_u16(len);
        self.body.put_slice(&tlv.value);
        Ok(())
    }

    pub fn write_tlvs(&mut self, tlvs: &[Tlv]) -> Result<(), CodecError> {
        tlvs.iter().try_for_each(|tlv| self.write_tlv(tlv))
    }

    fn take(&mut self, field: &'static str, len: usize) -> Result<&[u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::short(field, len, self.remaining()));
        }
        let start = self.position;
        self.position += len;
        Ok(&self.body[start..self.position])
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, CodecError> {
        Ok(self.take(field, 1)?[0])
    }

    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, CodecError> {
        let bytes = self.take(field, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, CodecError> {
        let bytes = self.take(field, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads up to and including the next NUL.
    pub fn read_cstring(&mut self, field: &'static str) -> Result<String, CodecError> {
        let rest = &self.body[self.position..];
        let Some(end) = rest.iter().position(|b| *b == 0) else {
            return Err(CodecError::Corrupt {
                field,
                reason: "missing NUL terminator".to_string(),
            });
        };
        let value = std::str::from_utf8(&rest[..end])
            .map_err(|e| CodecError::Corrupt {
                field,
                reason: e.to_string(),
            })?
            .to_string();
        self.position += end + 1;
        Ok(value)
    }

    pub fn read_octets(&mut self, field: &'static str, len: usize) -> Result<Vec<u8>, CodecError> {
        Ok(self.take(field, len)?.to_vec())
    }

    pub fn read_tlv(&mut self) -> Result<Tlv, CodecError> {
        let tag = TlvTag::from(self.read_u16("tlv tag")?);
        let len = self.read_u16("tlv length")? as usize;
        let value = self.read_octets("tlv value", len)?;
        Ok(Tlv { tag, value })
    }

    /// Reads TLVs until the body is exhausted.
    pub fn read_tlvs(&mut self) -> Result<Vec<Tlv>, CodecError> {
        let mut tlvs = Vec::new();
        while self.has_remaining() {
            tlvs.push(self.read_tlv()?);
        }
        Ok(tlvs)
    }

    /// Fails when the encoded PDU would exceed `MAX_PDU_SIZE`.
    pub fn check_length(&self) -> Result<(), CodecError> {
        if self.command_length() > MAX_PDU_SIZE as usize {
            return Err(CodecError::FieldTooLong {
                field: "command_length",
                max: MAX_PDU_SIZE as usize,
                actual: self.command_length(),
            });
        }
        Ok(())
    }

    /// Wire bytes with the length prefix computed from the current body.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.command_length());
        buf.put_u32(self.command_length() as u32);
        buf.put_u32(u32::from(self.command_id));
        buf.put_u32(u32::from(self.command_status));
        buf.put_u32(self.sequence_number);
        buf.put_slice(&self.body);
        buf.freeze()
    }

    /// Builds a PDU from a header and the body bytes already read for it.
    ///
    /// The declared length is not compared with `body`; framing is the
    /// transport's job.
    pub fn decode(header: &PduHeader, body: &[u8]) -> Self {
        Self {
            command_id: header.command_id,
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            body: body.to_vec(),
            position: 0,
        }
    }

    /// Parses one complete frame, checking the declared length matches.
    pub fn from_bytes(frame: &[u8]) -> Result<Self, CodecError> {
        let Some(header_bytes) = frame.first_chunk::<HEADER_LEN>() else {
            return Err(CodecError::LengthMismatch {
                declared: frame
                    .first_chunk::<4>()
                    .map_or(0, |b| u32::from_be_bytes(*b)),
                actual: frame.len(),
            });
        };
        let header = PduHeader::parse(header_bytes)?;
        if header.command_length as usize != frame.len() {
            return Err(CodecError::LengthMismatch {
                declared: header.command_length,
                actual: frame.len(),
            });
        }
        Ok(Self::decode(&header, &frame[HEADER_LEN..]))
    }
}

impl fmt::Debug for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pdu")
            .field("command_id", &self.command_id)
            .field("command_status", &self.command_status)
            .field("sequence_number", &self.sequence_number)
            .field("body_len", &self.body.len())
            .field("position", &self.position)
            .finish()
    }
}

impl fmt::Display for Pdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} seq={} status={:#x} len={}",
            self.command_id,
            self.sequence_number,
            self.command_status.code(),
            self.command_length()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pdu {
        let mut pdu = Pdu::new(CommandId::SubmitSm, 7);
        pdu.write_cstring("service_type", "", 6).unwrap();
        pdu.write_u8(1);
        pdu.write_u16(0xBEEF);
        pdu.write_u32(0xDEAD_BEEF);
        pdu.write_cstring("destination_addr", "447700900123", 21).unwrap();
        pdu.write_octets(b"hi");
        pdu
    }

    #[test]
    fn length_prefix_counts_header_and_body() {
        let pdu = sample();
        let wire = pdu.encode();

        assert_eq!(wire.len(), HEADER_LEN + pdu.body().len());
        assert_eq!(&wire[0..4], &(wire.len() as u32).to_be_bytes());
        assert_eq!(&wire[4..8], &[0, 0, 0, 4]);
        assert_eq!(&wire[12..16], &[0, 0, 0, 7]);
    }

    #[test]
    fn fields_read_back_in_write_order() {
        let mut pdu = Pdu::from_bytes(&sample().encode()).unwrap();

        assert_eq!(pdu.read_cstring("service_type").unwrap(), "");
        assert_eq!(pdu.read_u8("a").unwrap(), 1);
        assert_eq!(pdu.read_u16("b").unwrap(), 0xBEEF);
        assert_eq!(pdu.read_u32("c").unwrap(), 0xDEAD_BEEF);
        assert_eq!(pdu.read_cstring("destination_addr").unwrap(), "447700900123");
        assert_eq!(pdu.read_octets("sm", 2).unwrap(), b"hi");
        assert!(!pdu.has_remaining());
    }

    #[test]
    fn decodes_captured_frame() {
        let frame = [
            0x00, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00,
            0x00, 0x03, 0x74, 0x65, 0x73, 0x74, 0x00, 0xde, 0xad, 0xbe, 0xef, 0x13, 0x37, 0x80,
        ];
        let mut pdu = Pdu::from_bytes(&frame).unwrap();

        assert_eq!(pdu.command_id, CommandId::BindReceiver);
        assert_eq!(pdu.command_status, CommandStatus::InvalidCommandLength);
        assert_eq!(pdu.sequence_number, 3);
        assert_eq!(pdu.read_cstring("s").unwrap(), "test");
        assert_eq!(pdu.read_u32("o32").unwrap(), 0xdead_beef);
        assert_eq!(pdu.read_u16("o16").unwrap(), 0x1337);
        assert_eq!(pdu.read_u8("o8").unwrap(), 0x80);
        assert_eq!(&pdu.encode()[..], &frame[..]);
    }

    #[test]
    fn reading_past_the_end_is_corrupt() {
        let mut pdu = Pdu::new(CommandId::EnquireLink, 1);
        pdu.write_u8(9);

        assert_eq!(pdu.read_u8("first").unwrap(), 9);
        assert!(matches!(
            pdu.read_u32("second"),
            Err(CodecError::Corrupt { field: "second", .. })
        ));
        // A failed read leaves the cursor where it was.
        assert_eq!(pdu.position(), 1);
    }

    #[test]
    fn unterminated_cstring_is_corrupt() {
        let mut pdu = Pdu::new(CommandId::DeliverSm, 1);
        pdu.write_octets(b"no terminator");

        let err = pdu.read_cstring("service_type").unwrap_err();
        assert_eq!(
            err,
            CodecError::Corrupt {
                field: "service_type",
                reason: "missing NUL terminator".to_string()
            }
        );
    }

    #[test]
    fn cstring_limits_include_terminator() {
        let mut pdu = Pdu::new(CommandId::BindTransmitter, 1);
        assert!(pdu.write_cstring("password", "12345678", 9).is_ok());
        assert_eq!(
            pdu.write_cstring("password", "123456789", 9),
            Err(CodecError::FieldTooLong {
                field: "password",
                max: 8,
                actual: 9
            })
        );
    }

    #[test]
    fn tlvs_keep_order_and_duplicates() {
        let tlvs = vec![
            Tlv::u8(TlvTag::Other(0x1401), 1),
            Tlv::cstring(TlvTag::ReceiptedMessageId, "abc"),
            Tlv::u8(TlvTag::Other(0x1401), 2),
        ];
        let mut pdu = Pdu::new(CommandId::DeliverSm, 3);
        pdu.write_tlvs(&tlvs).unwrap();

        let mut decoded = Pdu::from_bytes(&pdu.encode()).unwrap();
        assert_eq!(decoded.read_tlvs().unwrap(), tlvs);
    }

    #[test]
    fn truncated_tlv_is_corrupt() {
        let mut pdu = Pdu::new(CommandId::DeliverSm, 3);
        pdu.write_u16(0x0427);
        pdu.write_u16(4);
        pdu.write_u8(1);
        assert!(matches!(
            pdu.read_tlvs(),
            Err(CodecError::Corrupt { field: "tlv value", .. })
        ));
    }

    #[test]
    fn from_bytes_checks_declared_length() {
        let mut wire = sample().encode().to_vec();
        wire.push(0);
        assert!(matches!(
            Pdu::from_bytes(&wire),
            Err(CodecError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Pdu::from_bytes(&wire[..10]),
            Err(CodecError::LengthMismatch { actual: 10, .. })
        ));
    }

    #[test]
    fn header_rejects_out_of_range_lengths() {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&8u32.to_be_bytes());
        assert!(matches!(
            PduHeader::parse(&header),
            Err(CodecError::InvalidPduLength { length: 8, .. })
        ));

        header[0..4].copy_from_slice(&(MAX_PDU_SIZE + 1).to_be_bytes());
        assert!(PduHeader::parse(&header).is_err());
    }

    #[test]
    fn unknown_command_survives_round_trip() {
        let pdu = Pdu::new(CommandId::NotDefined(0x0001_0001), 5)
            .with_status(CommandStatus::Other(0x400));
        let decoded = Pdu::from_bytes(&pdu.encode()).unwrap();

        assert_eq!(decoded.command_id, CommandId::NotDefined(0x0001_0001));
        assert_eq!(decoded.command_status.code(), 0x400);
        assert_eq!(decoded.body(), pdu.body());
    }

    #[test]
    fn oversized_pdu_fails_length_check() {
        let mut pdu = Pdu::new(CommandId::SubmitSm, 1);
        pdu.write_octets(&vec![0u8; MAX_PDU_SIZE as usize - HEADER_LEN]);
        assert_eq!(pdu.check_length(), Ok(()));

        pdu.write_u8(0);
        assert_eq!(
            pdu.check_length(),
            Err(CodecError::FieldTooLong {
                field: "command_length",
                max: MAX_PDU_SIZE as usize,
                actual: MAX_PDU_SIZE as usize + 1,
            })
        );
    }
}
