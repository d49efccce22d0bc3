//! Client → server frames

use serde::Deserialize;
use serde_json::Value;

use crate::types::{normalize_meta, Command, RelayError, RelayResult, Role};

/// Wire shape of the two frame types the relay understands
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientFrame {
    Register {
        role: String,
        #[serde(rename = "clientId", default)]
        client_id: Option<String>,
    },
    Cmd {
        cmd: String,
        #[serde(default)]
        meta: Option<Value>,
    },
}

/// A decoded inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Valid registration
    Register {
        role: Role,
        client_id: Option<String>,
    },
    /// Command to broadcast to the phones
    Command(Command),
    /// Well-formed JSON of some other type; logged and ignored
    Other(Value),
}

impl Inbound {
    /// Decode one text frame.
    ///
    /// Non-JSON input and `register`/`cmd` frames missing required fields
    /// fail with `MalformedFrame`. A registration naming a role other than
    /// `phone` or `controller` fails with `InvalidRole`.
    pub fn decode(text: &str) -> RelayResult<Self> {
        let value: Value = serde_json::from_str(text)?;

        let frame_type = value.get("type").and_then(Value::as_str);
        if !matches!(frame_type, Some("register") | Some("cmd")) {
            return Ok(Inbound::Other(value));
        }

        match serde_json::from_value::<ClientFrame>(value)? {
            ClientFrame::Register { role, client_id } => Ok(Inbound::Register {
                role: role.parse()?,
                client_id,
            }),
            ClientFrame::Cmd { cmd, meta } => Ok(Inbound::Command(Command {
                cmd,
                meta: normalize_meta(meta),
            })),
        }
    }

    /// Decode a binary frame holding UTF-8 JSON
    pub fn decode_bytes(bytes: &[u8]) -> RelayResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| RelayError::MalformedFrame(format!("binary frame is not UTF-8: {}", e)))?;
        Self::decode(text)
    }
}
