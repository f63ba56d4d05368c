// ABOUTME: Blocking SMPP client session driving an async transport on a private reactor
// ABOUTME: Bind state machine, sequence correlation, inbound PDU queue and deliver_sm handling

use crate::client::cancel::CancelHandle;
use crate::client::error::{SmppError, SmppResult};
use crate::client::msg_ref::{DefaultMessageRef, MessageRefGenerator};
use crate::client::types::{BindType, ClientConfig, QuerySmResult, SessionState, SmsParams};
use crate::codec::Pdu;
use crate::connection::Connection;
use crate::datatypes::{CommandId, CommandStatus, MessageState, SmppAddress, Tlv, TlvTag};
use crate::sms::{Boundary, CsmsMethod, Sms, split_with};
use crate::timeformat::parse_absolute;
use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tracing::{debug, info, trace, warn};

/// Highest sequence number handed out; SMPP allows 0x00000001 - 0x7FFFFFFF.
pub const MAX_SEQUENCE_NUMBER: u32 = 0x7FFF_FFFF;

/// Longest short_message, in octets.
pub const MAX_SHORT_MESSAGE_LEN: usize = 254;

const MAX_SYSTEM_ID_LEN: usize = 16;
const MAX_PASSWORD_LEN: usize = 9;
const MAX_SYSTEM_TYPE_LEN: usize = 13;
const MAX_ADDRESS_RANGE_LEN: usize = 41;
const MAX_SERVICE_TYPE_LEN: usize = 6;
const MAX_ADDR_LEN: usize = 21;
const MAX_TIME_LEN: usize = 17;
const MAX_MESSAGE_ID_LEN: usize = 65;

/// One SMPP session over one transport.
///
/// Every method blocks the calling thread for at most the configured write
/// or read timeout, driving the session's own current-thread tokio runtime
/// while it waits. Do not call these methods from inside an async context:
/// the runtime cannot be nested.
///
/// PDUs that arrive while a response is awaited are queued in arrival order
/// and picked up later by [`SmppClient::read_sms`], [`SmppClient::poll_sms`]
/// or [`SmppClient::enquire_link_respond`].
///
/// ```rust,no_run
/// use smpp_client::client::{ClientConfig, SmppClient};
/// use smpp_client::datatypes::SmppAddress;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let socket = std::net::TcpStream::connect("localhost:2775")?;
/// let mut client = SmppClient::from_std(socket, ClientConfig::default())?;
/// client.bind_transmitter("system_id", "password")?;
///
/// let from = SmppAddress::alphanumeric("INFO")?;
/// let to = SmppAddress::international("4512345678")?;
/// let (message_id, segments) = client.send_sms(&from, &to, b"Hello!")?;
/// println!("sent {message_id} in {segments} part(s)");
///
/// client.unbind()?;
/// # Ok(())
/// # }
/// ```
pub struct SmppClient<T = TcpStream> {
    // Dropped before the runtime it is registered with.
    connection: Connection<T>,
    runtime: Runtime,
    config: ClientConfig,
    state: SessionState,
    // Set once unbound or after a fatal error; the session cannot bind again.
    terminated: bool,
    // Last sequence number used.
    sequence_number: u32,
    queue: VecDeque<Pdu>,
    msg_ref: Box<dyn MessageRefGenerator + Send>,
    cancel: CancelHandle,
}

fn current_thread_runtime() -> SmppResult<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Runs `op` on `runtime` until it finishes, `limit` elapses or `cancel` fires.
fn drive<F, R>(runtime: &Runtime, cancel: &CancelHandle, limit: Duration, op: F) -> SmppResult<R>
where
    F: Future<Output = SmppResult<R>>,
{
    runtime.block_on(async {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SmppError::Cancelled),
            result = tokio::time::timeout(limit, op) => {
                result.unwrap_or_else(|_| Err(SmppError::Timeout(limit)))
            }
        }
    })
}

fn log_pdu(verbose: bool, direction: &'static str, pdu: &Pdu) {
    if verbose {
        debug!(direction, %pdu, "pdu");
    } else {
        trace!(direction, %pdu, "pdu");
    }
}

/// Queues a PDU for later consumption. Responses nobody is waiting for are
/// dropped: late answers to timed out requests and strays from the SMSC.
fn enqueue(queue: &mut VecDeque<Pdu>, pdu: Pdu) {
    if pdu.command_id.is_response() {
        warn!(
            command_id = ?pdu.command_id,
            sequence_number = pdu.sequence_number,
            status = pdu.command_status.code(),
            "dropping unexpected response"
        );
    } else {
        queue.push_back(pdu);
    }
}

fn expect_ok(pdu: Pdu) -> SmppResult<Pdu> {
    if pdu.command_status.is_ok() {
        Ok(pdu)
    } else {
        Err(SmppError::Protocol(pdu.command_status))
    }
}

impl SmppClient<TcpStream> {
    /// Takes over an already connected socket.
    pub fn from_std(socket: std::net::TcpStream, config: ClientConfig) -> SmppResult<Self> {
        let runtime = current_thread_runtime()?;
        socket.set_nonblocking(true)?;
        let socket = {
            let _guard = runtime.enter();
            TcpStream::from_std(socket)?
        };
        Ok(Self::with_runtime(runtime, socket, config))
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> SmppClient<T> {
    /// Creates a session in the OPEN state. No I/O is performed.
    pub fn new(transport: T, config: ClientConfig) -> SmppResult<Self> {
        Ok(Self::with_runtime(current_thread_runtime()?, transport, config))
    }

    fn with_runtime(runtime: Runtime, transport: T, config: ClientConfig) -> Self {
        SmppClient {
            connection: Connection::new(transport),
            runtime,
            config,
            state: SessionState::Open,
            terminated: false,
            sequence_number: 0,
            queue: VecDeque::new(),
            msg_ref: Box::new(DefaultMessageRef::default()),
            cancel: CancelHandle::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state.is_bound()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Settings changed here apply from the next operation.
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Number of received PDUs not yet consumed.
    pub fn queued_pdus(&self) -> usize {
        self.queue.len()
    }

    pub fn set_msg_ref_generator(&mut self, generator: impl MessageRefGenerator + Send + 'static) {
        self.msg_ref = Box::new(generator);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    #[cfg(test)]
    pub(crate) fn set_sequence_number(&mut self, last_used: u32) {
        self.sequence_number = last_used;
    }

    // Session state ---------------------------------------------------------

    fn check_state(
        &self,
        operation: &'static str,
        allowed: fn(&SessionState) -> bool,
    ) -> SmppResult<()> {
        if self.terminated || !allowed(&self.state) {
            return Err(SmppError::InvalidState {
                operation,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn terminate(&mut self, reason: &str) {
        if !self.terminated {
            debug!(from = ?self.state, reason, "session closed");
        }
        self.state = SessionState::Open;
        self.terminated = true;
    }

    fn next_sequence_number(&mut self) -> SmppResult<u32> {
        if self.sequence_number >= MAX_SEQUENCE_NUMBER {
            self.terminate("sequence numbers exhausted");
            return Err(SmppError::SequenceExhausted);
        }
        self.sequence_number += 1;
        Ok(self.sequence_number)
    }

    /// A write cut short leaves part of a PDU on the wire, so the framing
    /// towards the SMSC is lost.
    fn after_write<R>(&mut self, result: SmppResult<R>) -> SmppResult<R> {
        if let Err(err) = &result {
            match err {
                e if e.is_fatal() => self.terminate("transport failure"),
                SmppError::Timeout(_) | SmppError::Cancelled => {
                    self.terminate("write interrupted");
                }
                _ => {}
            }
        }
        result
    }

    /// A bad header, or a read abandoned part way through a PDU, means the
    /// inbound framing is lost. An abandoned read with nothing buffered is
    /// harmless.
    fn after_read<R>(&mut self, result: SmppResult<R>) -> SmppResult<R> {
        if let Err(err) = &result {
            match err {
                e if e.is_fatal() => self.terminate("transport failure"),
                SmppError::Codec(_) => {
                    self.connection.discard_buffered();
                    self.terminate("unframeable input");
                }
                SmppError::Timeout(_) | SmppError::Cancelled => {
                    if self.connection.buffered_len() > 0 {
                        self.connection.discard_buffered();
                        self.terminate("partial pdu abandoned");
                    }
                }
                _ => {}
            }
        }
        result
    }

    // Transport -------------------------------------------------------------

    fn write(&mut self, pdu: &Pdu) -> SmppResult<()> {
        log_pdu(self.config.verbose, "write", pdu);
        let limit = self.config.write_timeout;
        let result = drive(
            &self.runtime,
            &self.cancel,
            limit,
            self.connection.write_pdu(pdu),
        );
        self.after_write(result)
    }

    fn read_one(&mut self, limit: Duration) -> SmppResult<Pdu> {
        let result = drive(
            &self.runtime,
            &self.cancel,
            limit,
            self.connection.read_pdu(),
        );
        let pdu = self.after_read(result)?;
        log_pdu(self.config.verbose, "read", &pdu);
        Ok(pdu)
    }

    /// Queues everything the transport already has, without waiting.
    fn fill_queue(&mut self) -> SmppResult<()> {
        let limit = self.config.write_timeout;
        let result = drive(
            &self.runtime,
            &self.cancel,
            limit,
            self.connection.fill_available(),
        );
        self.after_read(result)?;

        loop {
            let parsed = self.connection.parse_pdu();
            match self.after_read(parsed)? {
                Some(pdu) => {
                    log_pdu(self.config.verbose, "read", &pdu);
                    enqueue(&mut self.queue, pdu);
                }
                None => return Ok(()),
            }
        }
    }

    /// Sends `pdu` and blocks until the response with the same sequence
    /// number arrives. Anything else read meanwhile is queued.
    ///
    /// The response is returned whatever its command_status. A GENERIC_NACK
    /// for the same sequence number ends the wait with `Protocol(status)`.
    /// Other responses read while waiting are dropped.
    pub fn send_command(&mut self, pdu: &Pdu) -> SmppResult<Pdu> {
        if self.terminated {
            return Err(SmppError::InvalidState {
                operation: "send_command",
                actual: self.state,
            });
        }
        self.write(pdu)?;

        let expected = pdu.command_id.response();
        let sequence_number = pdu.sequence_number;
        let limit = self.config.read_timeout;
        let verbose = self.config.verbose;
        let Self {
            runtime,
            connection,
            cancel,
            queue,
            ..
        } = self;

        let result = drive(runtime, cancel, limit, async {
            loop {
                let incoming = connection.read_pdu().await?;
                log_pdu(verbose, "read", &incoming);
                if incoming.sequence_number == sequence_number {
                    if incoming.command_id == expected {
                        return Ok(incoming);
                    }
                    if incoming.command_id == CommandId::GenericNack {
                        warn!(
                            sequence_number,
                            status = incoming.command_status.code(),
                            "request rejected with generic_nack"
                        );
                        return Err(SmppError::Protocol(incoming.command_status));
                    }
                }
                enqueue(queue, incoming);
            }
        });
        self.after_read(result)
    }

    fn respond(&mut self, request: &Pdu, status: CommandStatus) -> SmppResult<()> {
        let mut response = Pdu::new(request.command_id.response(), request.sequence_number)
            .with_status(status);
        if matches!(request.command_id, CommandId::DeliverSm | CommandId::DataSm) {
            response.write_cstring("message_id", "", MAX_MESSAGE_ID_LEN)?;
        }
        self.write(&response)
    }

    // Bind / unbind ---------------------------------------------------------

    pub fn bind_transmitter(&mut self, system_id: &str, password: &str) -> SmppResult<()> {
        self.bind(BindType::Transmitter, system_id, password)
    }

    pub fn bind_receiver(&mut self, system_id: &str, password: &str) -> SmppResult<()> {
        self.bind(BindType::Receiver, system_id, password)
    }

    pub fn bind_transceiver(&mut self, system_id: &str, password: &str) -> SmppResult<()> {
        self.bind(BindType::Transceiver, system_id, password)
    }

    pub fn bind(&mut self, bind_type: BindType, system_id: &str, password: &str) -> SmppResult<()> {
        self.check_state("bind", |state| *state == SessionState::Open)?;
        if system_id.len() >= MAX_SYSTEM_ID_LEN {
            return Err(SmppError::InvalidData(format!(
                "system_id longer than {} characters",
                MAX_SYSTEM_ID_LEN - 1
            )));
        }
        if password.len() >= MAX_PASSWORD_LEN {
            return Err(SmppError::InvalidData(format!(
                "password longer than {} characters",
                MAX_PASSWORD_LEN - 1
            )));
        }

        let mut pdu = Pdu::new(bind_type.command_id(), self.next_sequence_number()?);
        pdu.write_cstring("system_id", system_id, MAX_SYSTEM_ID_LEN)?;
        pdu.write_cstring("password", password, MAX_PASSWORD_LEN)?;
        pdu.write_cstring("system_type", &self.config.system_type, MAX_SYSTEM_TYPE_LEN)?;
        pdu.write_u8(self.config.interface_version.into());
        pdu.write_u8(self.config.addr_ton.into());
        pdu.write_u8(self.config.addr_npi.into());
        pdu.write_cstring("address_range", &self.config.addr_range, MAX_ADDRESS_RANGE_LEN)?;

        let mut response = expect_ok(self.send_command(&pdu)?)?;
        // Some SMSCs send an empty body; the bind itself succeeded.
        let smsc = match response.read_cstring("system_id") {
            Ok(smsc) => smsc,
            Err(err) => {
                warn!(error = %err, "bind_resp without a readable system_id");
                String::new()
            }
        };

        self.state = bind_type.bound_state();
        info!(?bind_type, system_id, smsc = %smsc, "bound");
        debug!(state = ?self.state, "state changed");
        Ok(())
    }

    /// Sends UNBIND and waits for the response, whatever its status.
    ///
    /// The session is OPEN afterwards even if the exchange failed, and cannot
    /// be bound again.
    pub fn unbind(&mut self) -> SmppResult<()> {
        self.check_state("unbind", SessionState::is_bound)?;

        let result = self
            .next_sequence_number()
            .and_then(|seq| self.send_command(&Pdu::new(CommandId::Unbind, seq)));
        let previous = self.state;
        self.terminate("unbind");

        match result {
            Ok(response) => {
                info!(from = ?previous, status = response.command_status.code(), "unbound");
                Ok(())
            }
            Err(SmppError::Timeout(limit)) => {
                warn!(?limit, "no unbind_resp before timeout");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "unbind failed");
                Err(err)
            }
        }
    }

    // Submission ------------------------------------------------------------

    /// Sends a message with default parameters, split if it does not fit one
    /// SUBMIT_SM. Returns the id of the last part and the number of parts.
    pub fn send_sms(
        &mut self,
        sender: &SmppAddress,
        receiver: &SmppAddress,
        message: &[u8],
    ) -> SmppResult<(String, usize)> {
        self.send_sms_with(sender, receiver, message, &SmsParams::default(), &[])
    }

    /// As [`SmppClient::send_sms`]; `tlvs` are added to every part after any
    /// concatenation TLVs.
    pub fn send_sms_with(
        &mut self,
        sender: &SmppAddress,
        receiver: &SmppAddress,
        message: &[u8],
        params: &SmsParams,
        tlvs: &[Tlv],
    ) -> SmppResult<(String, usize)> {
        self.check_state("send_sms", SessionState::can_transmit)?;

        // Room for the NUL that `submit` appends.
        let terminator = usize::from(self.config.null_terminate_octet_strings);
        let limits = params.data_coding.limits();
        if message.len() + terminator <= limits.single {
            let id = self.submit(sender, receiver, message, params, tlvs)?;
            return Ok((id, 1));
        }

        let method = self.config.csms_method;
        let reference = self.msg_ref.next_ref();
        let segments = split_with(
            message,
            method,
            limits.segment - terminator,
            reference,
            Boundary::for_coding(params.data_coding),
        )?;
        debug!(?method, reference, parts = segments.len(), "splitting message");

        let mut message_id = String::new();
        for mut segment in segments.iter().cloned() {
            if self.config.null_terminate_octet_strings && method == CsmsMethod::Payload {
                for tlv in &mut segment.tlvs {
                    if tlv.tag == TlvTag::MessagePayload {
                        tlv.value.push(0);
                    }
                }
            }
            let mut part_params = params.clone();
            if segment.udhi {
                part_params.esm_class = part_params.esm_class.with_udhi();
            }
            segment.tlvs.extend_from_slice(tlvs);
            message_id = self.submit(
                sender,
                receiver,
                &segment.short_message,
                &part_params,
                &segment.tlvs,
            )?;
        }
        Ok((message_id, segments.len()))
    }

    /// Sends exactly one SUBMIT_SM and returns the SMSC message id.
    pub fn submit_sm(
        &mut self,
        sender: &SmppAddress,
        receiver: &SmppAddress,
        short_message: &[u8],
        params: &SmsParams,
        tlvs: &[Tlv],
    ) -> SmppResult<String> {
        self.check_state("submit_sm", SessionState::can_transmit)?;
        self.submit(sender, receiver, short_message, params, tlvs)
    }

    fn submit(
        &mut self,
        sender: &SmppAddress,
        receiver: &SmppAddress,
        short_message: &[u8],
        params: &SmsParams,
        tlvs: &[Tlv],
    ) -> SmppResult<String> {
        let terminate = self.config.null_terminate_octet_strings && !short_message.is_empty();
        let sm_length = short_message.len() + usize::from(terminate);
        if sm_length > MAX_SHORT_MESSAGE_LEN {
            return Err(SmppError::InvalidData(format!(
                "short_message is {sm_length} octets, limit is {MAX_SHORT_MESSAGE_LEN}"
            )));
        }

        let mut pdu = Pdu::new(CommandId::SubmitSm, 0);
        pdu.write_cstring("service_type", &params.service_type, MAX_SERVICE_TYPE_LEN)?;
        pdu.write_u8(sender.ton.into());
        pdu.write_u8(sender.npi.into());
        pdu.write_cstring("source_addr", sender.as_str(), MAX_ADDR_LEN)?;
        pdu.write_u8(receiver.ton.into());
        pdu.write_u8(receiver.npi.into());
        pdu.write_cstring("destination_addr", receiver.as_str(), MAX_ADDR_LEN)?;
        pdu.write_u8(params.esm_class.bits());
        pdu.write_u8(params.protocol_id);
        pdu.write_u8(params.priority_flag.into());
        pdu.write_cstring(
            "schedule_delivery_time",
            &params.schedule_delivery_time,
            MAX_TIME_LEN,
        )?;
        pdu.write_cstring("validity_period", &params.validity_period, MAX_TIME_LEN)?;
        pdu.write_u8(params.registered_delivery);
        pdu.write_u8(params.replace_if_present_flag);
        pdu.write_u8(params.data_coding.to_byte());
        pdu.write_u8(params.sm_default_msg_id);
        pdu.write_u8(sm_length as u8);
        pdu.write_octets(short_message);
        if terminate {
            pdu.write_u8(0);
        }
        pdu.write_tlvs(tlvs)?;

        // Allocated last so a rejected message does not use up a number.
        pdu.sequence_number = self.next_sequence_number()?;
        let mut response = expect_ok(self.send_command(&pdu)?)?;
        Ok(response.read_cstring("message_id")?)
    }

    /// Asks the SMSC for the state of a message it accepted earlier.
    pub fn query_sm(&mut self, message_id: &str, source: &SmppAddress) -> SmppResult<QuerySmResult> {
        self.check_state("query_sm", SessionState::can_transmit)?;

        let mut pdu = Pdu::new(CommandId::QuerySm, 0);
        pdu.write_cstring("message_id", message_id, MAX_MESSAGE_ID_LEN)?;
        pdu.write_u8(source.ton.into());
        pdu.write_u8(source.npi.into());
        pdu.write_cstring("source_addr", source.as_str(), MAX_ADDR_LEN)?;
        pdu.sequence_number = self.next_sequence_number()?;

        let mut response = expect_ok(self.send_command(&pdu)?)?;
        let message_id = response.read_cstring("message_id")?;
        let final_date = response.read_cstring("final_date")?;
        let message_state = MessageState::from(response.read_u8("message_state")?);
        let error_code = response.read_u8("error_code")?;

        let final_date = parse_absolute(&final_date)
            .map_err(|e| SmppError::InvalidData(format!("final_date {final_date:?}: {e}")))?;

        Ok(QuerySmResult {
            message_id,
            final_date,
            message_state,
            error_code,
        })
    }

    // Keep-alive ------------------------------------------------------------

    /// Sends ENQUIRE_LINK and waits for the response.
    pub fn enquire_link(&mut self) -> SmppResult<()> {
        self.check_state("enquire_link", SessionState::is_bound)?;
        let pdu = Pdu::new(CommandId::EnquireLink, self.next_sequence_number()?);
        expect_ok(self.send_command(&pdu)?)?;
        Ok(())
    }

    /// Answers an ENQUIRE_LINK from the SMSC if one has arrived. Never waits
    /// for one. Returns whether a response was sent.
    pub fn enquire_link_respond(&mut self) -> SmppResult<bool> {
        self.check_state("enquire_link_respond", SessionState::is_bound)?;

        let mut position = self.find_queued(CommandId::EnquireLink);
        if position.is_none() {
            self.fill_queue()?;
            position = self.find_queued(CommandId::EnquireLink);
        }

        match position.and_then(|i| self.queue.remove(i)) {
            Some(request) => {
                self.respond(&request, CommandStatus::Ok)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_queued(&self, command_id: CommandId) -> Option<usize> {
        self.queue.iter().position(|pdu| pdu.command_id == command_id)
    }

    // Receiving -------------------------------------------------------------

    /// Returns the oldest DELIVER_SM, from the queue or the transport.
    ///
    /// Blocks for at most `read_timeout` in total. Every DELIVER_SM and
    /// DATA_SM passed is acknowledged and alerts are dropped. An UNBIND from
    /// the SMSC is answered and ends the session with `ConnectionClosed`.
    pub fn read_sms(&mut self) -> SmppResult<Sms> {
        self.check_state("read_sms", SessionState::can_receive)?;

        let timeout = self.config.read_timeout;
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(sms) = self.take_queued_sms()? {
                return Ok(sms);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SmppError::Timeout(timeout));
            }
            match self.read_one(remaining) {
                Ok(pdu) => enqueue(&mut self.queue, pdu),
                Err(SmppError::Timeout(_)) => return Err(SmppError::Timeout(timeout)),
                Err(err) => return Err(err),
            }
        }
    }

    /// Like [`SmppClient::read_sms`] but never waits: returns [`Sms::null`]
    /// when no DELIVER_SM is available.
    pub fn poll_sms(&mut self) -> SmppResult<Sms> {
        self.check_state("poll_sms", SessionState::can_receive)?;

        if let Some(sms) = self.take_queued_sms()? {
            return Ok(sms);
        }
        self.fill_queue()?;
        Ok(self.take_queued_sms()?.unwrap_or_else(Sms::null))
    }

    /// Scans the queue oldest first for a DELIVER_SM, handling the PDUs
    /// that are never surfaced as messages on the way.
    fn take_queued_sms(&mut self) -> SmppResult<Option<Sms>> {
        let mut i = 0;
        while i < self.queue.len() {
            match self.queue[i].command_id {
                CommandId::DeliverSm => {
                    let Some(pdu) = self.queue.remove(i) else {
                        break;
                    };
                    return match Sms::from_pdu(&pdu) {
                        Ok(sms) => {
                            self.respond(&pdu, CommandStatus::Ok)?;
                            Ok(Some(sms))
                        }
                        Err(err) => {
                            warn!(error = %err, sequence_number = pdu.sequence_number, "undecodable deliver_sm");
                            self.respond(&pdu, err.to_command_status())?;
                            Err(err.into())
                        }
                    };
                }
                CommandId::DataSm => {
                    if let Some(pdu) = self.queue.remove(i) {
                        debug!(sequence_number = pdu.sequence_number, "acknowledging data_sm");
                        self.respond(&pdu, CommandStatus::Ok)?;
                    }
                }
                CommandId::Unbind => {
                    if let Some(pdu) = self.queue.remove(i) {
                        info!(sequence_number = pdu.sequence_number, "unbound by smsc");
                        let answered = self.respond(&pdu, CommandStatus::Ok);
                        self.terminate("unbound by smsc");
                        answered?;
                        return Err(SmppError::ConnectionClosed);
                    }
                }
                CommandId::AlertNotification => {
                    if let Some(pdu) = self.queue.remove(i) {
                        debug!(sequence_number = pdu.sequence_number, "dropping alert_notification");
                    }
                }
                _ => i += 1,
            }
        }
        Ok(None)
    }
}
