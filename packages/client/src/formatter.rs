//! Rendering of server events for the terminal.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::ui::short_name;

/// Formats server events into display lines. All methods are pure; the
/// session supplies the receive time.
pub struct MessageFormatter;

impl MessageFormatter {
    fn clock(received_at: DateTime<Local>) -> String {
        received_at.format("%H:%M:%S").to_string()
    }

    /// Identity announcement right after connecting.
    pub fn format_ident(user_id: &str) -> String {
        format!("* You are {}\n", user_id)
    }

    /// Someone (possibly us) joined a channel.
    pub fn format_joined(source: &str, channel: &str, own_id: Option<&str>) -> String {
        if own_id == Some(source) {
            format!("* You joined {}\n", short_name(channel))
        } else {
            format!("* {} joined {}\n", short_name(source), short_name(channel))
        }
    }

    /// Someone left a channel, explicitly or by disconnecting.
    pub fn format_left(
        source: &str,
        channel: &str,
        reason: Option<&str>,
        own_id: Option<&str>,
    ) -> String {
        let who = if own_id == Some(source) {
            "You".to_string()
        } else {
            short_name(source).to_string()
        };
        match reason {
            Some(reason) => format!("* {} left {} ({})\n", who, short_name(channel), reason),
            None => format!("* {} left {}\n", who, short_name(channel)),
        }
    }

    /// A relayed message. Payload elements are shown space-separated;
    /// strings verbatim, everything else as JSON.
    pub fn format_message(
        source: &str,
        payload: &[Value],
        received_at: DateTime<Local>,
    ) -> String {
        let rendered: Vec<String> = payload
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        format!(
            "[{}] {}: {}\n",
            Self::clock(received_at),
            short_name(source),
            rendered.join(" ")
        )
    }

    /// A PONG reply.
    pub fn format_pong(payload: &Value) -> String {
        match payload {
            Value::Null => "* pong\n".to_string(),
            Value::String(s) => format!("* pong: {}\n", s),
            other => format!("* pong: {}\n", other),
        }
    }

    /// An ERROR reply.
    pub fn format_error(code: &str, target: Option<&str>) -> String {
        match target {
            Some(target) => format!("! error {}: {}\n", code, target),
            None => format!("! error {}\n", code),
        }
    }

    /// Anything the client does not recognize.
    pub fn format_raw(text: &str) -> String {
        format!("? {}\n", text)
    }
}
