// ABOUTME: Supporting types for the SMPP client: session states, bind types and configuration
// ABOUTME: Per-message submit parameters and the query_sm result

use crate::datatypes::{
    CommandId, DataCoding, EsmClass, InterfaceVersion, MessageState, NumericPlanIndicator,
    PriorityFlag, TypeOfNumber,
};
use crate::sms::CsmsMethod;
use crate::timeformat::format_absolute;
use chrono::{DateTime, FixedOffset};
use std::time::Duration;

/// Bind state of a session (Section 2.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Connected, not bound.
    #[default]
    Open,
    BoundTx,
    BoundRx,
    BoundTrx,
}

impl SessionState {
    pub fn is_bound(&self) -> bool {
        *self != SessionState::Open
    }

    /// May submit messages and query them.
    pub fn can_transmit(&self) -> bool {
        matches!(self, SessionState::BoundTx | SessionState::BoundTrx)
    }

    /// May receive deliver_sm.
    pub fn can_receive(&self) -> bool {
        matches!(self, SessionState::BoundRx | SessionState::BoundTrx)
    }
}

/// Type of SMPP bind operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindType {
    /// Bind as transmitter (can send submit_sm)
    Transmitter,
    /// Bind as receiver (can receive deliver_sm)
    Receiver,
    /// Bind as transceiver (both transmitter and receiver capabilities)
    Transceiver,
}

impl BindType {
    pub fn command_id(&self) -> CommandId {
        match self {
            BindType::Transmitter => CommandId::BindTransmitter,
            BindType::Receiver => CommandId::BindReceiver,
            BindType::Transceiver => CommandId::BindTransceiver,
        }
    }

    /// State entered after a successful bind.
    pub fn bound_state(&self) -> SessionState {
        match self {
            BindType::Transmitter => SessionState::BoundTx,
            BindType::Receiver => SessionState::BoundRx,
            BindType::Transceiver => SessionState::BoundTrx,
        }
    }
}

/// Session settings. Everything here is a plain value; none of it is sent
/// until the operation that uses it runs.
///
/// # Example
///
/// ```rust
/// use smpp_client::client::ClientConfig;
/// use smpp_client::sms::CsmsMethod;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_system_type("SMPP")
///     .with_csms_method(CsmsMethod::EightBitUdh)
///     .with_read_timeout(Duration::from_secs(10));
/// assert_eq!(config.write_timeout, Duration::from_millis(5000));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent in every bind (default: empty)
    pub system_type: String,
    pub interface_version: InterfaceVersion,
    /// addr_ton sent in bind (default: Unknown)
    pub addr_ton: TypeOfNumber,
    /// addr_npi sent in bind (default: Unknown)
    pub addr_npi: NumericPlanIndicator,
    /// address_range sent in bind (default: empty)
    pub addr_range: String,

    /// Append a NUL to short_message and MESSAGE_PAYLOAD values (default: true)
    ///
    /// The NUL counts towards sm_length and the TLV length.
    pub null_terminate_octet_strings: bool,

    /// How messages longer than one SUBMIT_SM are sent (default: 16-bit SAR tags)
    pub csms_method: CsmsMethod,

    /// Deadline for writing one PDU (default: 5 seconds)
    pub write_timeout: Duration,

    /// Deadline for a response, or for `read_sms` as a whole (default: 30 seconds)
    pub read_timeout: Duration,

    /// Log every PDU at debug level instead of trace (default: false)
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            system_type: String::new(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            addr_range: String::new(),
            null_terminate_octet_strings: true,
            csms_method: CsmsMethod::SixteenBitTags,
            write_timeout: Duration::from_millis(5000),
            read_timeout: Duration::from_millis(30000),
            verbose: false,
        }
    }
}

impl ClientConfig {
    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }

    pub fn with_interface_version(mut self, version: InterfaceVersion) -> Self {
        self.interface_version = version;
        self
    }

    pub fn with_address(
        mut self,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
        range: impl Into<String>,
    ) -> Self {
        self.addr_ton = ton;
        self.addr_npi = npi;
        self.addr_range = range.into();
        self
    }

    pub fn with_null_terminate_octet_strings(mut self, enabled: bool) -> Self {
        self.null_terminate_octet_strings = enabled;
        self
    }

    pub fn with_csms_method(mut self, method: CsmsMethod) -> Self {
        self.csms_method = method;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Per-message SUBMIT_SM fields. `Default` gives all-zero values and empty
/// time strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmsParams {
    pub service_type: String,
    pub esm_class: EsmClass,
    pub protocol_id: u8,
    pub priority_flag: PriorityFlag,
    /// SMPP time string; empty for immediate delivery
    pub schedule_delivery_time: String,
    /// SMPP time string; empty for the SMSC default
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
}

impl SmsParams {
    /// Request an SMSC delivery receipt for success or failure.
    pub const RECEIPT_ON_FINAL: u8 = 0x01;

    pub fn with_service_type(mut self, service_type: impl Into<String>) -> Self {
        self.service_type = service_type.into();
        self
    }

    pub fn with_esm_class(mut self, esm_class: EsmClass) -> Self {
        self.esm_class = esm_class;
        self
    }

    pub fn with_protocol_id(mut self, protocol_id: u8) -> Self {
        self.protocol_id = protocol_id;
        self
    }

    pub fn with_priority(mut self, priority: PriorityFlag) -> Self {
        self.priority_flag = priority;
        self
    }

    pub fn with_schedule_delivery_time(mut self, at: &DateTime<FixedOffset>) -> Self {
        self.schedule_delivery_time = format_absolute(at);
        self
    }

    pub fn with_validity_period(mut self, until: &DateTime<FixedOffset>) -> Self {
        self.validity_period = format_absolute(until);
        self
    }

    pub fn with_delivery_receipt(mut self) -> Self {
        self.registered_delivery = Self::RECEIPT_ON_FINAL;
        self
    }

    pub fn with_replace_if_present(mut self, replace: bool) -> Self {
        self.replace_if_present_flag = u8::from(replace);
        self
    }

    pub fn with_data_coding(mut self, data_coding: DataCoding) -> Self {
        self.data_coding = data_coding;
        self
    }

    pub fn with_sm_default_msg_id(mut self, id: u8) -> Self {
        self.sm_default_msg_id = id;
        self
    }
}

/// Decoded QUERY_SM_RESP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySmResult {
    pub message_id: String,
    /// When the message reached a final state; `None` while it has not.
    pub final_date: Option<DateTime<FixedOffset>>,
    pub message_state: MessageState,
    /// Network specific, passed through unchanged.
    pub error_code: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.system_type, "");
        assert_eq!(u8::from(config.interface_version), 0x34);
        assert_eq!(config.addr_ton, TypeOfNumber::Unknown);
        assert_eq!(config.addr_npi, NumericPlanIndicator::Unknown);
        assert!(config.null_terminate_octet_strings);
        assert_eq!(config.csms_method, CsmsMethod::SixteenBitTags);
        assert_eq!(config.write_timeout, Duration::from_millis(5000));
        assert_eq!(config.read_timeout, Duration::from_millis(30000));
        assert!(!config.verbose);
    }

    #[test]
    fn bind_types_map_to_states() {
        assert_eq!(BindType::Receiver.command_id(), CommandId::BindReceiver);
        assert_eq!(BindType::Transceiver.bound_state(), SessionState::BoundTrx);
        assert!(SessionState::BoundTrx.can_transmit());
        assert!(SessionState::BoundTrx.can_receive());
        assert!(!SessionState::BoundRx.can_transmit());
        assert!(!SessionState::Open.is_bound());
    }

    #[test]
    fn params_builder() {
        let at = DateTime::parse_from_rfc3339("2024-03-01T12:00:00+01:00").unwrap();
        let params = SmsParams::default()
            .with_delivery_receipt()
            .with_data_coding(DataCoding::Ucs2)
            .with_schedule_delivery_time(&at);

        assert_eq!(params.registered_delivery, 1);
        assert_eq!(params.data_coding, DataCoding::Ucs2);
        assert_eq!(params.schedule_delivery_time, "240301120000004+");
        assert_eq!(params.validity_period, "");
    }
}
