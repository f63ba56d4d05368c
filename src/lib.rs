// ABOUTME: SMPP v3.4 client library: PDU codec, message model and a blocking client session
// ABOUTME: Re-exports the types most applications need at the crate root

pub mod client;
pub mod codec;
pub mod connection;
pub mod datatypes;
pub mod delivery_report;
pub mod sms;
pub mod timeformat;


// Re-export codec types for direct access
pub use codec::{CodecError, MAX_PDU_SIZE, Pdu, PduHeader};

pub use delivery_report::{DeliveryReport, ReportError};
pub use sms::{CsmsMethod, Segment, Sms, split};

// Re-export the main client API for easy access
pub use client::{
    CancelHandle, ClientConfig, MessageRefGenerator, QuerySmResult, SessionState, SmppClient,
    SmppError, SmppResult, SmsParams,
};
