// ABOUTME: SMPP message_state values reported by query_sm_resp and delivery receipts
// ABOUTME: Maps between the numeric state and the stat: token used in receipt text

use num_enum::{FromPrimitive, IntoPrimitive};

/// State of a previously submitted message (Section 5.2.28).
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageState {
    Enroute = 1,
    Delivered = 2,
    Expired = 3,
    Deleted = 4,
    Undeliverable = 5,
    Accepted = 6,
    Unknown = 7,
    Rejected = 8,
    #[num_enum(catch_all)]
    Other(u8),
}

impl MessageState {
    /// The token that appears after `stat:` in a delivery receipt.
    pub fn as_stat(&self) -> &'static str {
        match self {
            MessageState::Enroute => "ENROUTE",
            MessageState::Delivered => "DELIVRD",
            MessageState::Expired => "EXPIRED",
            MessageState::Deleted => "DELETED",
            MessageState::Undeliverable => "UNDELIV",
            MessageState::Accepted => "ACCEPTD",
            MessageState::Rejected => "REJECTD",
            MessageState::Unknown | MessageState::Other(_) => "UNKNOWN",
        }
    }

    pub fn from_stat(stat: &str) -> MessageState {
        match stat {
            "ENROUTE" => MessageState::Enroute,
            "DELIVRD" => MessageState::Delivered,
            "EXPIRED" => MessageState::Expired,
            "DELETED" => MessageState::Deleted,
            "UNDELIV" => MessageState::Undeliverable,
            "ACCEPTD" => MessageState::Accepted,
            "REJECTD" => MessageState::Rejected,
            _ => MessageState::Unknown,
        }
    }

    /// True once the SMSC will no longer change this state.
    pub fn is_final(&self) -> bool {
        !matches!(
            self,
            MessageState::Enroute | MessageState::Accepted | MessageState::Unknown
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_tokens_round_trip() {
        for raw in 1..=8u8 {
            let state = MessageState::from(raw);
            if state == MessageState::Unknown {
                continue;
            }
            assert_eq!(MessageState::from_stat(state.as_stat()), state);
        }
    }

    #[test]
    fn unassigned_state_is_kept() {
        let state = MessageState::from(0x2A);
        assert_eq!(state, MessageState::Other(0x2A));
        assert_eq!(u8::from(state), 0x2A);
        assert_eq!(state.as_stat(), "UNKNOWN");
    }
}
