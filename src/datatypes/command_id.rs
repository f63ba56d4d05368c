// ABOUTME: Defines SMPP v3.4 command_id values with a catch-all for reserved and vendor ranges
// ABOUTME: Maps request PDUs to their response counterparts for sequence correlation

use num_enum::{FromPrimitive, IntoPrimitive};

/// The command_id field identifies the SMPP PDU (Section 5.1.2.1).
///
/// Values outside the named set decode to `NotDefined(raw)` and encode back to
/// the same raw value.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    GenericNack = 0x8000_0000,
    BindReceiver = 0x0000_0001,
    BindReceiverResp = 0x8000_0001,
    BindTransmitter = 0x0000_0002,
    BindTransmitterResp = 0x8000_0002,
    QuerySm = 0x0000_0003,
    QuerySmResp = 0x8000_0003,
    SubmitSm = 0x0000_0004,
    SubmitSmResp = 0x8000_0004,
    DeliverSm = 0x0000_0005,
    DeliverSmResp = 0x8000_0005,
    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,
    ReplaceSm = 0x0000_0007,
    ReplaceSmResp = 0x8000_0007,
    CancelSm = 0x0000_0008,
    CancelSmResp = 0x8000_0008,
    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,
    // Reserved 0x0000000A - 0x8000000A
    Outbind = 0x0000_000B,
    // Reserved 0x0000000C - 0x00000014
    //          0x8000000B - 0x80000014
    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,
    // Reserved 0x00000016 - 0x00000020
    //          0x80000016 - 0x80000020
    SubmitMulti = 0x0000_0021,
    SubmitMultiResp = 0x8000_0021,
    // Reserved 0x00000022 - 0x000000FF
    //          0x80000022 - 0x800000FF
    AlertNotification = 0x0000_0102,
    DataSm = 0x0000_0103,
    DataSmResp = 0x8000_0103,
    /// Reserved, SMPP extension or SMSC vendor specific value
    #[num_enum(catch_all)]
    NotDefined(u32),
}

impl CommandId {
    const RESPONSE_BIT: u32 = 0x8000_0000;

    /// Check if this command_id represents a response PDU
    pub fn is_response(&self) -> bool {
        u32::from(*self) & Self::RESPONSE_BIT != 0
    }

    /// The `*_resp` command_id an SMSC answers this request with.
    ///
    /// Responses map to themselves.
    pub fn response(&self) -> CommandId {
        CommandId::from(u32::from(*self) | Self::RESPONSE_BIT)
    }
}
