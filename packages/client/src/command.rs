//! REPL input parsing.
//!
//! Lines starting with `/` are commands; anything else is sent to the most
//! recently joined channel.

use thiserror::Error;

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    /// `/join [channel]`: omit the name to create a fresh channel.
    Join { channel: Option<String> },
    /// `/leave [channel]`: defaults to the current channel.
    Leave { channel: Option<String> },
    /// `/msg <target> <text>`: channel name or user id.
    Msg { target: String, text: String },
    /// `/ping [payload]`
    Ping { payload: Option<String> },
    /// A bare line: send to the current channel.
    Say { text: String },
    /// `/help`
    Help,
    /// `/quit`
    Quit,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '/{0}' (try /help)")]
    UnknownCommand(String),
    #[error("usage: /msg <target> <text>")]
    MsgUsage,
}

/// Parse one line of REPL input. Empty lines are the caller's concern.
pub fn parse_input(line: &str) -> Result<ReplInput, ParseError> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(ReplInput::Say {
            text: line.to_string(),
        });
    };

    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (rest, ""),
    };

    match command {
        "join" => Ok(ReplInput::Join {
            channel: non_empty(args),
        }),
        "leave" => Ok(ReplInput::Leave {
            channel: non_empty(args),
        }),
        "msg" => {
            let Some((target, text)) = args.split_once(char::is_whitespace) else {
                return Err(ParseError::MsgUsage);
            };
            let text = text.trim();
            if text.is_empty() {
                return Err(ParseError::MsgUsage);
            }
            Ok(ReplInput::Msg {
                target: target.to_string(),
                text: text.to_string(),
            })
        }
        "ping" => Ok(ReplInput::Ping {
            payload: non_empty(args),
        }),
        "help" => Ok(ReplInput::Help),
        "quit" | "exit" => Ok(ReplInput::Quit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn non_empty(args: &str) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.to_string())
    }
}
