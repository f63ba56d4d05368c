// ABOUTME: Delivery receipt view over an Sms whose esm_class marks it as a receipt
// ABOUTME: Parses the id/sub/dlvrd/submit date/done date/stat/err/text grammar and receipt TLVs

use crate::datatypes::{MessageState, TlvTag};
use crate::sms::Sms;
use crate::timeformat::{TimeFormatError, parse_report_date};
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("esm_class {0:#04x} does not mark a delivery receipt")]
    NotAReceipt(u8),
    #[error("receipt has no '{0}' field")]
    MissingKey(&'static str),
    #[error("receipt field '{key}' has invalid value {value:?}")]
    InvalidField { key: &'static str, value: String },
    #[error("receipt field '{key}' is not a valid timestamp: {source}")]
    InvalidTimestamp {
        key: &'static str,
        #[source]
        source: TimeFormatError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryReport {
    pub id: String,
    pub sub: u32,
    pub dlvrd: u32,
    pub submit_date: NaiveDateTime,
    pub done_date: NaiveDateTime,
    pub stat: String,
    pub state: MessageState,
    pub err: String,
    pub text: String,
}

// Keys in the order they appear in receipt text.
const KEYS: [&str; 8] = [
    "id",
    "sub",
    "dlvrd",
    "submit date",
    "done date",
    "stat",
    "err",
    "text",
];

/// Values found for each of `KEYS`, by index.
fn scan(body: &str) -> [Option<&str>; 8] {
    let mut found = [None; 8];
    let mut rest = body;

    for (i, key) in KEYS.iter().enumerate() {
        rest = rest.trim_start();
        let label_len = key.len() + 1;
        let matches = rest.get(..label_len).is_some_and(|label| {
            let label = label.as_bytes();
            label[..key.len()].eq_ignore_ascii_case(key.as_bytes()) && label[key.len()] == b':'
        });
        if !matches {
            continue;
        }
        rest = &rest[label_len..];

        if *key == "text" {
            found[i] = Some(rest);
            break;
        }
        let end = rest.find(' ').unwrap_or(rest.len());
        found[i] = Some(&rest[..end]);
        rest = &rest[end..];
    }
    found
}

impl DeliveryReport {
    pub fn parse(sms: &Sms) -> Result<Self, ReportError> {
        if !sms.is_delivery_receipt() {
            return Err(ReportError::NotAReceipt(sms.esm_class.bits()));
        }

        let body = String::from_utf8_lossy(sms.message());
        let body = body.trim_end_matches('\0');
        let [id, sub, dlvrd, submit_date, done_date, stat, err, text] = scan(body);

        let id = match sms
            .tlv(TlvTag::ReceiptedMessageId)
            .and_then(|tlv| tlv.value_cstring())
        {
            Some(tlv_id) => tlv_id.to_string(),
            None => id.ok_or(ReportError::MissingKey("id"))?.to_string(),
        };

        let (stat, state) = match sms.tlv(TlvTag::MessageState).and_then(|tlv| tlv.value_u8()) {
            Some(raw) => {
                let state = MessageState::from(raw);
                (state.as_stat().to_string(), state)
            }
            None => {
                let stat = stat.ok_or(ReportError::MissingKey("stat"))?;
                (stat.to_string(), MessageState::from_stat(stat))
            }
        };

        Ok(DeliveryReport {
            id,
            sub: count("sub", sub)?,
            dlvrd: count("dlvrd", dlvrd)?,
            submit_date: date("submit date", submit_date)?,
            done_date: date("done date", done_date)?,
            stat,
            state,
            err: err.ok_or(ReportError::MissingKey("err"))?.to_string(),
            text: text.unwrap_or_default().to_string(),
        })
    }
}

fn count(key: &'static str, value: Option<&str>) -> Result<u32, ReportError> {
    let value = value.ok_or(ReportError::MissingKey(key))?;
    value.parse().map_err(|_| ReportError::InvalidField {
        key,
        value: value.to_string(),
    })
}

fn date(key: &'static str, value: Option<&str>) -> Result<NaiveDateTime, ReportError> {
    let value = value.ok_or(ReportError::MissingKey(key))?;
    parse_report_date(value).map_err(|source| ReportError::InvalidTimestamp { key, source })
}
