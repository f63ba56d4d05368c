// ABOUTME: SMPP client module: the blocking session and its configuration and error types
// ABOUTME: Exports the client components used to bind, submit, query and receive messages

//! SMPP Client Module
//!
//! [`SmppClient`] is a synchronous SMPP v3.4 session. Each call blocks for at
//! most the configured timeout while the session drives its own tokio
//! reactor, so callers need no async runtime of their own.
//!
//! ## Receiving
//!
//! ```rust,no_run
//! use smpp_client::client::{ClientConfig, SmppClient, SmppError};
//! use smpp_client::DeliveryReport;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let socket = std::net::TcpStream::connect("localhost:2775")?;
//! let mut client = SmppClient::from_std(socket, ClientConfig::default())?;
//! client.bind_receiver("system_id", "password")?;
//!
//! loop {
//!     match client.read_sms() {
//!         Ok(sms) if sms.is_delivery_receipt() => {
//!             let report = DeliveryReport::parse(&sms)?;
//!             println!("{} is {}", report.id, report.stat);
//!         }
//!         Ok(sms) => println!("message from {}", sms.source),
//!         Err(SmppError::Timeout(_)) => {
//!             client.enquire_link_respond()?;
//!         }
//!         Err(err) => return Err(err.into()),
//!     }
//! }
//! # }
//! ```

pub mod cancel;
pub mod error;
pub mod msg_ref;
pub mod session;
pub mod types;

pub use cancel::CancelHandle;
pub use error::{SmppError, SmppResult};
pub use msg_ref::{DefaultMessageRef, MessageRefGenerator};
pub use session::{MAX_SEQUENCE_NUMBER, MAX_SHORT_MESSAGE_LEN, SmppClient};
pub use types::{BindType, ClientConfig, QuerySmResult, SessionState, SmsParams};
