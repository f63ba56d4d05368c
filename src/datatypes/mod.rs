mod address;
mod command_id;
mod command_status;
mod data_coding;
mod esm_class;
mod interface_version;
mod message_state;
mod numeric_plan_indicator;
mod priority_flag;
mod tlv;
mod type_of_number;

pub use address::{AddressError, MAX_ADDRESS_LEN, SmppAddress};
pub use command_id::CommandId;
pub use command_status::CommandStatus;
pub use data_coding::{DataCoding, SegmentLimits};
pub use esm_class::EsmClass;
pub use interface_version::InterfaceVersion;
pub use message_state::MessageState;
pub use numeric_plan_indicator::NumericPlanIndicator;
pub use priority_flag::PriorityFlag;
pub use tlv::{Tlv, TlvTag, find_tlv};
pub use type_of_number::TypeOfNumber;
