//! Wire protocol
//!
//! Every unit on the wire is a [frame](frame): a 2-byte big-endian length
//! followed by that many bytes of UTF-8. The server sends one frame per tick
//! carrying a [`WeatherReport`](crate::weather::WeatherReport) in its textual
//! form; subscribers may send [control frames](control).

pub mod control;
pub mod frame;

pub use control::ControlFrame;
pub use frame::{
    decode_frame, encode_frame, read_frame, write_encoded, write_frame, MAX_PAYLOAD_LEN,
};
