//! Wire protocol: order-significant JSON arrays carried as WebSocket text
//! frames.
//!
//! Every envelope is a JSON array, never an object. Client frames have the
//! shape `[seq, cmd, obj, ...payload]` where `seq` is an arbitrary
//! client-chosen correlation token echoed back in direct replies. Server
//! frames are either direct replies `[seq, cmd, ...args]` or unsolicited
//! events `[0, sourceUserId, cmd, ...args]`; the leading `0` is the
//! broadcast marker that tells event traffic apart from reply traffic.

use serde_json::{Value, json};
use thiserror::Error;

/// Leading element of every server-originated event that is not a direct
/// reply to a client request.
pub const BROADCAST_MARKER: i64 = 0;

/// Quit reason attached to departure notices emitted by the disconnect path.
pub const QUIT_REASON: &str = "Quit: connection closed";

/// Error codes carried in `[seq, "ERROR", code, obj?]` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The named channel or user does not exist.
    NoSuchTarget,
    /// A required argument was missing from the frame.
    InvalidArgument,
    /// The sender is not a member of the named channel.
    NotInChannel,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NoSuchTarget => "ENOENT",
            ErrorCode::InvalidArgument => "EINVAL",
            ErrorCode::NotInChannel => "NOT_IN_CHAN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client frame that failed to decode. Any of these is a protocol
/// violation: the connection it arrived on cannot be trusted and is dropped
/// without an error reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("frame is not a JSON array")]
    NotAnArray,
    #[error("frame has {0} element(s), expected at least 2")]
    TooShort(usize),
    #[error("command tag is not a string")]
    CommandNotString,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("command target must be a string or null")]
    InvalidTarget,
}

/// The closed set of client commands, decoded once from the wire shape and
/// dispatched by exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Join a channel, creating it if no name was supplied.
    Join { channel: Option<String> },
    /// Leave a channel by name.
    Leave { channel: Option<String> },
    /// Send a payload to a channel or directly to a user.
    Msg {
        target: Option<String>,
        payload: Vec<Value>,
    },
    /// Heartbeat; the payload is echoed back verbatim.
    Ping { payload: Value },
}

/// A decoded client frame: correlation token plus command.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub seq: Value,
    pub command: Command,
}

/// Decode one inbound text frame into a [`Frame`].
///
/// The target slot (`obj`) must be a string or null for `JOIN`/`LEAVE`/`MSG`;
/// an empty string is normalized to "absent", mirroring how the reference
/// protocol treats falsy targets. `PING` accepts any JSON value as its echo
/// payload.
pub fn decode_frame(text: &str) -> Result<Frame, WireError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| WireError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(WireError::NotAnArray);
    };
    if items.len() < 2 {
        return Err(WireError::TooShort(items.len()));
    }

    let mut items = items.into_iter();
    let seq = items.next().expect("length checked above");
    let cmd = items.next().expect("length checked above");
    let obj = items.next();
    let rest: Vec<Value> = items.collect();

    let Some(cmd) = cmd.as_str() else {
        return Err(WireError::CommandNotString);
    };

    let command = match cmd {
        "JOIN" => Command::Join {
            channel: decode_target(obj)?,
        },
        "LEAVE" => Command::Leave {
            channel: decode_target(obj)?,
        },
        "MSG" => Command::Msg {
            target: decode_target(obj)?,
            payload: rest,
        },
        "PING" => Command::Ping {
            payload: obj.unwrap_or(Value::Null),
        },
        other => return Err(WireError::UnknownCommand(other.to_string())),
    };

    Ok(Frame { seq, command })
}

fn decode_target(obj: Option<Value>) -> Result<Option<String>, WireError> {
    match obj {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(WireError::InvalidTarget),
    }
}

// ---------------------------------------------------------------------------
// Server-side encoders
// ---------------------------------------------------------------------------

/// `[0, "IDENT", userId]`: sent to a connection as soon as it is registered.
pub fn ident_event(user_id: &str) -> String {
    json!([BROADCAST_MARKER, "IDENT", user_id]).to_string()
}

/// `[0, sourceUserId, "JOIN", channel]`
pub fn join_event(source: &str, channel: &str) -> String {
    json!([BROADCAST_MARKER, source, "JOIN", channel]).to_string()
}

/// `[0, sourceUserId, "LEAVE", channel]`: explicit departure.
pub fn leave_event(source: &str, channel: &str) -> String {
    json!([BROADCAST_MARKER, source, "LEAVE", channel]).to_string()
}

/// `[0, sourceUserId, "LEAVE", channel, reason]`: disconnect-driven
/// departure, carrying a quit reason for the remaining members.
pub fn quit_event(source: &str, channel: &str, reason: &str) -> String {
    json!([BROADCAST_MARKER, source, "LEAVE", channel, reason]).to_string()
}

/// `[0, sourceUserId, ...payload]`: a relayed message, to a channel member
/// or a direct recipient alike.
pub fn message_event(source: &str, payload: &[Value]) -> String {
    let mut items = vec![json!(BROADCAST_MARKER), json!(source)];
    items.extend(payload.iter().cloned());
    Value::Array(items).to_string()
}

/// `[seq, "PONG", payload]`
pub fn pong_reply(seq: &Value, payload: &Value) -> String {
    json!([seq, "PONG", payload]).to_string()
}

/// `[seq, "ERROR", code]` or `[seq, "ERROR", code, target]`.
pub fn error_reply(seq: &Value, code: ErrorCode, target: Option<&str>) -> String {
    match target {
        Some(target) => json!([seq, "ERROR", code.as_str(), target]).to_string(),
        None => json!([seq, "ERROR", code.as_str()]).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client-side decoding
// ---------------------------------------------------------------------------

/// A server frame as seen by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `[0, "IDENT", userId]`
    Ident { user_id: String },
    /// `[0, source, "JOIN", channel]`
    Joined { source: String, channel: String },
    /// `[0, source, "LEAVE", channel, reason?]`
    Left {
        source: String,
        channel: String,
        reason: Option<String>,
    },
    /// `[0, source, ...payload]`: a relayed message.
    Message { source: String, payload: Vec<Value> },
    /// `[seq, "PONG", payload]`
    Pong { seq: Value, payload: Value },
    /// `[seq, "ERROR", code, target?]`
    Error {
        seq: Value,
        code: String,
        target: Option<String>,
    },
    /// Anything that does not match a known shape; displayed raw.
    Other(Vec<Value>),
}

/// Decode one server frame. Unknown but well-formed arrays come back as
/// [`ServerEvent::Other`] so the caller can still show them.
pub fn decode_server_event(text: &str) -> Result<ServerEvent, WireError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| WireError::InvalidJson(e.to_string()))?;
    let Value::Array(items) = value else {
        return Err(WireError::NotAnArray);
    };
    if items.len() < 2 {
        return Err(WireError::TooShort(items.len()));
    }

    let is_event = items[0] == json!(BROADCAST_MARKER);

    if is_event {
        if let (Some("IDENT"), Some(Value::String(id))) =
            (items[1].as_str(), items.get(2))
        {
            return Ok(ServerEvent::Ident {
                user_id: id.clone(),
            });
        }
        if let Some(source) = items[1].as_str() {
            let source = source.to_string();
            match (items.get(2).and_then(Value::as_str), items.get(3)) {
                (Some("JOIN"), Some(Value::String(channel))) => {
                    return Ok(ServerEvent::Joined {
                        source,
                        channel: channel.clone(),
                    });
                }
                (Some("LEAVE"), Some(Value::String(channel))) => {
                    return Ok(ServerEvent::Left {
                        source,
                        channel: channel.clone(),
                        reason: items.get(4).and_then(Value::as_str).map(str::to_string),
                    });
                }
                _ => {
                    return Ok(ServerEvent::Message {
                        source,
                        payload: items[2..].to_vec(),
                    });
                }
            }
        }
        return Ok(ServerEvent::Other(items));
    }

    let tag = items[1].as_str().map(str::to_string);
    match tag.as_deref() {
        Some("PONG") => Ok(ServerEvent::Pong {
            seq: items[0].clone(),
            payload: items.get(2).cloned().unwrap_or(Value::Null),
        }),
        Some("ERROR") => Ok(ServerEvent::Error {
            seq: items[0].clone(),
            code: items
                .get(2)
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN")
                .to_string(),
            target: items.get(3).and_then(Value::as_str).map(str::to_string),
        }),
        _ => Ok(ServerEvent::Other(items)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_with_channel() {
        // テスト項目: チャンネル名付きの JOIN フレームがデコードされる
        // given (前提条件):
        let text = r#"[1, "JOIN", "lobby"]"#;

        // when (操作):
        let frame = decode_frame(text).unwrap();

        // then (期待する結果):
        assert_eq!(frame.seq, json!(1));
        assert_eq!(
            frame.command,
            Command::Join {
                channel: Some("lobby".to_string())
            }
        );
    }

    #[test]
    fn test_decode_join_without_channel() {
        // テスト項目: チャンネル名なし（null / 省略 / 空文字列）の JOIN は channel が None になる
        for text in [r#"[1, "JOIN", null]"#, r#"[1, "JOIN"]"#, r#"[1, "JOIN", ""]"#] {
            let frame = decode_frame(text).unwrap();
            assert_eq!(frame.command, Command::Join { channel: None }, "input: {text}");
        }
    }

    #[test]
    fn test_decode_msg_with_payload() {
        // テスト項目: MSG フレームのペイロードが順序どおり保持される
        // given (前提条件):
        let text = r#"[7, "MSG", "lobby", "hello", 42]"#;

        // when (操作):
        let frame = decode_frame(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            frame.command,
            Command::Msg {
                target: Some("lobby".to_string()),
                payload: vec![json!("hello"), json!(42)],
            }
        );
    }

    #[test]
    fn test_decode_leave_and_ping() {
        // テスト項目: LEAVE と PING が正しいバリアントにデコードされる
        let leave = decode_frame(r#"["a", "LEAVE", "lobby"]"#).unwrap();
        assert_eq!(
            leave.command,
            Command::Leave {
                channel: Some("lobby".to_string())
            }
        );

        let ping = decode_frame(r#"[7, "PING", {"echo": true}]"#).unwrap();
        assert_eq!(
            ping.command,
            Command::Ping {
                payload: json!({"echo": true})
            }
        );
    }

    #[test]
    fn test_decode_ping_accepts_any_payload() {
        // テスト項目: PING の obj には任意の JSON 値を渡せる
        let frame = decode_frame(r#"[1, "PING"]"#).unwrap();
        assert_eq!(frame.command, Command::Ping { payload: Value::Null });

        let frame = decode_frame(r#"[1, "PING", [1, 2, 3]]"#).unwrap();
        assert_eq!(
            frame.command,
            Command::Ping {
                payload: json!([1, 2, 3])
            }
        );
    }

    #[test]
    fn test_decode_rejects_malformed_frames() {
        // テスト項目: 不正な形状のフレームはプロトコル違反として拒否される
        assert!(matches!(
            decode_frame("not json"),
            Err(WireError::InvalidJson(_))
        ));
        assert_eq!(
            decode_frame(r#"{"cmd": "JOIN"}"#),
            Err(WireError::NotAnArray)
        );
        assert_eq!(decode_frame(r#"[1]"#), Err(WireError::TooShort(1)));
        assert_eq!(decode_frame(r#"[1, 2, "x"]"#), Err(WireError::CommandNotString));
        assert_eq!(
            decode_frame(r#"[1, "SHOUT", "x"]"#),
            Err(WireError::UnknownCommand("SHOUT".to_string()))
        );
        assert_eq!(
            decode_frame(r#"[1, "JOIN", {"name": "lobby"}]"#),
            Err(WireError::InvalidTarget)
        );
    }

    #[test]
    fn test_encode_events() {
        // テスト項目: サーバー送信フレームが仕様どおりの JSON 配列になる
        assert_eq!(ident_event("u1"), r#"[0,"IDENT","u1"]"#);
        assert_eq!(join_event("u1", "lobby"), r#"[0,"u1","JOIN","lobby"]"#);
        assert_eq!(leave_event("u1", "lobby"), r#"[0,"u1","LEAVE","lobby"]"#);
        assert_eq!(
            quit_event("u1", "lobby", "Quit: connection closed"),
            r#"[0,"u1","LEAVE","lobby","Quit: connection closed"]"#
        );
        assert_eq!(
            message_event("u1", &[json!("hi"), json!(1)]),
            r#"[0,"u1","hi",1]"#
        );
    }

    #[test]
    fn test_encode_replies() {
        // テスト項目: 直接応答フレームが seq を保持したまま生成される
        assert_eq!(pong_reply(&json!(7), &json!("abc")), r#"[7,"PONG","abc"]"#);
        assert_eq!(
            error_reply(&json!(3), ErrorCode::NoSuchTarget, Some("foo")),
            r#"[3,"ERROR","ENOENT","foo"]"#
        );
        assert_eq!(
            error_reply(&json!("s"), ErrorCode::InvalidArgument, None),
            r#"["s","ERROR","EINVAL"]"#
        );
        assert_eq!(
            error_reply(&json!(1), ErrorCode::NotInChannel, None),
            r#"[1,"ERROR","NOT_IN_CHAN"]"#
        );
    }

    #[test]
    fn test_decode_server_event_roundtrip() {
        // テスト項目: サーバーフレームがクライアント側で正しい種別に分類される
        assert_eq!(
            decode_server_event(&ident_event("u1")).unwrap(),
            ServerEvent::Ident {
                user_id: "u1".to_string()
            }
        );
        assert_eq!(
            decode_server_event(&join_event("u1", "lobby")).unwrap(),
            ServerEvent::Joined {
                source: "u1".to_string(),
                channel: "lobby".to_string()
            }
        );
        assert_eq!(
            decode_server_event(&quit_event("u1", "lobby", "Quit: connection closed")).unwrap(),
            ServerEvent::Left {
                source: "u1".to_string(),
                channel: "lobby".to_string(),
                reason: Some("Quit: connection closed".to_string()),
            }
        );
        assert_eq!(
            decode_server_event(&message_event("u1", &[json!("hi")])).unwrap(),
            ServerEvent::Message {
                source: "u1".to_string(),
                payload: vec![json!("hi")],
            }
        );
        assert_eq!(
            decode_server_event(&pong_reply(&json!(7), &json!("abc"))).unwrap(),
            ServerEvent::Pong {
                seq: json!(7),
                payload: json!("abc")
            }
        );
        assert_eq!(
            decode_server_event(&error_reply(&json!(3), ErrorCode::NoSuchTarget, Some("foo")))
                .unwrap(),
            ServerEvent::Error {
                seq: json!(3),
                code: "ENOENT".to_string(),
                target: Some("foo".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_server_event_unknown_shape() {
        // テスト項目: 未知の形状のフレームは Other として返される
        let event = decode_server_event(r#"[5, "WHAT", 1]"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::Other(vec![json!(5), json!("WHAT"), json!(1)])
        );
    }
}
