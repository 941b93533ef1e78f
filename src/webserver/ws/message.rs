/// WebSocket message schema - envelope and control messages
///
/// Every data message from server to client uses the same envelope:
/// protocol version, topic code, server timestamp, per-topic sequence
/// number, and a typed payload. Control messages (hello/ping and their
/// responses) are tagged separately.
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTOCOL_VERSION: u8 = 1;

// ============================================================================
// TOPICS
// ============================================================================

/// Topic codes for routing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// One Detection per emission, pushed as the poll loop discovers them
    DetectionsNew,

    /// Periodic server status snapshot
    SystemStatus,
}

impl Topic {
    /// Topic code string used in the envelope
    pub fn code(&self) -> &'static str {
        match self {
            Topic::DetectionsNew => "detections.new",
            Topic::SystemStatus => "system.status",
        }
    }

    /// Parse topic from code string
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "detections.new" => Some(Topic::DetectionsNew),
            "system.status" => Some(Topic::SystemStatus),
            _ => None,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// ENVELOPE
// ============================================================================

/// Standard data envelope (server → client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEnvelope {
    /// Protocol version
    pub v: u8,

    /// Topic code (e.g. "detections.new")
    pub t: String,

    /// Server timestamp (unix milliseconds)
    pub ts: i64,

    /// Sequence number, monotonic per topic
    pub seq: u64,

    /// Topic-specific payload
    pub data: serde_json::Value,
}

impl WsEnvelope {
    /// Create an envelope stamped with the current time
    pub fn new(topic: Topic, seq: u64, data: serde_json::Value) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            t: topic.code().to_string(),
            ts: chrono::Utc::now().timestamp_millis(),
            seq,
            data,
        }
    }
}

// ============================================================================
// CLIENT MESSAGES (client → server)
// ============================================================================

/// Client control messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Initial handshake
    Hello {
        #[serde(default)]
        client_id: Option<String>,
    },

    /// Keepalive
    Ping {
        #[serde(default)]
        id: Option<String>,
    },
}

// ============================================================================
// SERVER MESSAGES (server → client)
// ============================================================================

/// Server messages: data envelopes plus control responses
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Data message (envelope fields inlined)
    Data(WsEnvelope),

    /// Acknowledge a control message
    Ack {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
    },

    /// Error response
    Error {
        message: String,
        code: String,
    },

    /// Pong response to a client ping
    Pong {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
