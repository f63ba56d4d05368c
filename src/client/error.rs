// ABOUTME: SMPP client error types covering transport, protocol, format, state and exhaustion failures
// ABOUTME: Converts codec, receipt and I/O errors so session code can use `?` throughout

use crate::client::types::SessionState;
use crate::codec::CodecError;
use crate::datatypes::CommandStatus;
use crate::delivery_report::ReportError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Error type for SMPP client operations
///
/// Callers can tell whether a failure is worth retrying ([`SmppError::is_retryable`]),
/// whether the session is finished ([`SmppError::is_fatal`]), or whether the
/// SMSC rejected the request ([`SmppError::Protocol`]).
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O error on the transport
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// The peer closed the connection
    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    /// A read or write did not finish before its deadline
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The operation was interrupted through a `CancelHandle`
    #[error("Operation cancelled")]
    Cancelled,

    /// SMPP protocol error indicated by command_status field
    #[error("Protocol error: {0:?}")]
    Protocol(CommandStatus),

    /// A PDU could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A delivery receipt body could not be parsed
    #[error("Delivery report error: {0}")]
    Report(#[from] ReportError),

    /// Client not in correct state for operation
    #[error("{operation} not allowed in state {actual:?}")]
    InvalidState {
        operation: &'static str,
        actual: SessionState,
    },

    /// Every sequence number has been used
    #[error("Sequence numbers exhausted")]
    SequenceExhausted,

    /// Data validation error (invalid message length, malformed addresses, etc.)
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for SMPP operations
pub type SmppResult<T> = Result<T, SmppError>;

impl SmppError {
    /// Timeouts and cancellation. The session stays bound unless the
    /// interrupted operation had already put part of a PDU on the wire or
    /// read part of one; check `SmppClient::is_bound` before retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SmppError::Timeout(_) | SmppError::Cancelled)
    }

    /// The session must be discarded after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SmppError::Transport(_) | SmppError::ConnectionClosed | SmppError::SequenceExhausted
        )
    }
}

impl From<crate::datatypes::AddressError> for SmppError {
    fn from(err: crate::datatypes::AddressError) -> Self {
        SmppError::InvalidData(err.to_string())
    }
}
