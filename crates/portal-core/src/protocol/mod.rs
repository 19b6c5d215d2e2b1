//! Protocol module containing the counters documents and their JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_report, decode_response, encode_report, ProtocolError};
pub use messages::*;
