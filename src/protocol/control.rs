//! Client-to-server control frames
//!
//! Subscribers may send `SUBSCRIBE:<city>` or `UNSUBSCRIBE`. The server
//! parses and logs them; delivery is not filtered by city.

use std::fmt;

/// Prefix of a subscribe request
pub const SUBSCRIBE_PREFIX: &str = "SUBSCRIBE:";

/// Literal unsubscribe request
pub const UNSUBSCRIBE: &str = "UNSUBSCRIBE";

/// A parsed inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFrame {
    /// `SUBSCRIBE:<city>`
    Subscribe(String),
    /// `UNSUBSCRIBE`
    Unsubscribe,
    /// Anything else
    Unknown(String),
}

impl ControlFrame {
    /// Parse an inbound payload. Never fails; unrecognized text is kept as
    /// [`ControlFrame::Unknown`].
    pub fn parse(payload: &str) -> Self {
        if let Some(city) = payload.strip_prefix(SUBSCRIBE_PREFIX) {
            return ControlFrame::Subscribe(city.trim().to_string());
        }
        if payload.trim() == UNSUBSCRIBE {
            return ControlFrame::Unsubscribe;
        }
        ControlFrame::Unknown(payload.to_string())
    }

    /// Wire text for this frame
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ControlFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlFrame::Subscribe(city) => write!(f, "{}{}", SUBSCRIBE_PREFIX, city),
            ControlFrame::Unsubscribe => f.write_str(UNSUBSCRIBE),
            ControlFrame::Unknown(text) => f.write_str(text),
        }
    }
}
