//! Server → client frames

use serde::Serialize;
use serde_json::Value;

use crate::types::{Command, RelayError, RelayResult, Role};

/// Frames the relay pushes to connected peers
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Registration acknowledgment; `time` is Unix milliseconds
    Welcome { role: Role, time: i64 },

    /// A command forwarded to a phone
    Cmd { cmd: String, meta: Option<Value> },

    /// Error reported back to the peer that caused it
    Error { error: String, message: String },
}

impl ServerFrame {
    pub fn welcome(role: Role) -> Self {
        ServerFrame::Welcome {
            role,
            time: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn command(command: &Command) -> Self {
        ServerFrame::Cmd {
            cmd: command.cmd.clone(),
            meta: command.meta.clone(),
        }
    }

    pub fn error(err: &RelayError) -> Self {
        ServerFrame::Error {
            error: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn to_json(&self) -> RelayResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_frame_serializes_null_meta() {
        let json: Value =
            serde_json::from_str(&ServerFrame::command(&Command::new("senter_on")).to_json().unwrap())
                .unwrap();
        assert_eq!(json, json!({"type": "cmd", "cmd": "senter_on", "meta": null}));
    }

    #[test]
    fn test_welcome_frame() {
        let json: Value =
            serde_json::from_str(&ServerFrame::welcome(Role::Phone).to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["role"], "phone");
        assert!(json["time"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_error_frame() {
        let frame = ServerFrame::error(&RelayError::InvalidRole("tv".to_string()));
        let json: Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"], "InvalidRole");
        assert_eq!(json["message"], "invalid role 'tv'");
    }
}
