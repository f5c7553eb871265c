use crate::mode::Stacking;
use serde::{Deserialize, Serialize};

/// Messages from the overlay to control clients (JSON-lines over Unix socket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DaemonMsg {
    /// Status response.
    #[serde(rename = "status")]
    Status {
        stacking: Stacking,
        passthrough: bool,
        /// Index into the palette.
        color: usize,
        windows: usize,
        version: String,
    },
    /// Acknowledgement for commands.
    #[serde(rename = "ack")]
    Ack { ok: bool, message: String },
}

/// Messages from control clients to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Move the overlay between the overlay and bottom layers (same as SIGUSR1).
    #[serde(rename = "toggle_layer")]
    ToggleLayer,
    /// Make the overlay click-through or interactive again (same as SIGUSR2).
    #[serde(rename = "toggle_passthrough")]
    TogglePassthrough,
    /// Wipe every window.
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "next_color")]
    NextColor,
    #[serde(rename = "prev_color")]
    PrevColor,
    /// Exit the overlay (same as SIGTERM).
    #[serde(rename = "quit")]
    Quit,
    #[serde(rename = "get_status")]
    GetStatus,
}

/// Serialize a message as a JSON line (with trailing newline).
pub fn encode(msg: &impl Serialize) -> String {
    let mut s = serde_json::to_string(msg).expect("serialize IPC message");
    s.push('\n');
    s
}

/// Deserialize a JSON line. Returns None on empty/whitespace input.
pub fn decode_daemon(line: &str) -> Option<DaemonMsg> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

pub fn decode_client(line: &str) -> Option<ClientMsg> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_single_trailing_newline() {
        let encoded = encode(&DaemonMsg::Ack {
            ok: true,
            message: "line one".into(),
        });
        assert!(encoded.ends_with('\n'));
        assert_eq!(encoded.matches('\n').count(), 1);
    }

    #[test]
    fn client_msgs_use_snake_case_tags() {
        assert_eq!(encode(&ClientMsg::ToggleLayer), "{\"type\":\"toggle_layer\"}\n");
        assert_eq!(
            encode(&ClientMsg::TogglePassthrough),
            "{\"type\":\"toggle_passthrough\"}\n"
        );
        assert_eq!(encode(&ClientMsg::GetStatus), "{\"type\":\"get_status\"}\n");
    }

    #[test]
    fn decode_client_accepts_hand_written_json() {
        assert_eq!(
            decode_client("  {\"type\": \"next_color\"}  "),
            Some(ClientMsg::NextColor)
        );
        assert_eq!(decode_client("{\"type\":\"quit\"}"), Some(ClientMsg::Quit));
    }

    #[test]
    fn status_round_trips() {
        let msg = DaemonMsg::Status {
            stacking: Stacking::Bottom,
            passthrough: true,
            color: 3,
            windows: 2,
            version: "0.1.0".into(),
        };
        assert_eq!(decode_daemon(&encode(&msg)), Some(msg));
    }

    #[test]
    fn status_serializes_stacking_lowercase() {
        let msg = DaemonMsg::Status {
            stacking: Stacking::Overlay,
            passthrough: false,
            color: 0,
            windows: 1,
            version: "0.1.0".into(),
        };
        assert!(encode(&msg).contains("\"stacking\":\"overlay\""));
    }

    // --- empty/whitespace input → None ---

    #[test]
    fn decode_returns_none_for_empty() {
        assert!(decode_daemon("").is_none());
        assert!(decode_daemon("   ").is_none());
        assert!(decode_client("\n").is_none());
    }

    // --- invalid JSON → None (not panic) ---

    #[test]
    fn decode_returns_none_for_garbage() {
        assert!(decode_daemon("not json").is_none());
        assert!(decode_client("{\"type\":\"unknown_variant\"}").is_none());
        assert!(decode_client("{}").is_none());
    }
}
