//! Command payloads relayed to phones

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command on its way to the phones. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Command name, e.g. `senter_on`
    pub cmd: String,

    /// Optional structured arguments
    #[serde(default)]
    pub meta: Option<Value>,
}

impl Command {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = normalize_meta(Some(meta));
        self
    }
}

/// JSON `null` meta is the same as no meta at all
pub fn normalize_meta(meta: Option<Value>) -> Option<Value> {
    meta.filter(|v| !v.is_null())
}
