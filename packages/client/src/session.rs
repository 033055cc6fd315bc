//! WebSocket client session management.

use std::sync::{Arc, Mutex};

use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use kakehashi_shared::wire::{self, ServerEvent};

use crate::{
    command::{ReplInput, parse_input},
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

const HELP_TEXT: &str = "\
commands:
  /join [channel]      join a channel (omit the name to create one)
  /leave [channel]     leave a channel (defaults to the current one)
  /msg <target> <text> message a channel or a user id
  /ping [payload]      heartbeat
  /quit                exit
anything else is sent to the current channel.
";

/// What the session learns while it runs: our identity and the channel bare
/// lines are sent to (the most recently joined one).
#[derive(Debug, Default)]
struct SessionState {
    user_id: Option<String>,
    current_channel: Option<String>,
}

type SharedState = Arc<Mutex<SessionState>>;

/// Run one WebSocket client session until the connection ends.
pub async fn run_client_session(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to relay server");
    println!("\nConnected. Type /help for commands, Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();
    let state: SharedState = Arc::new(Mutex::new(SessionState::default()));

    // Task: receive server frames, update session state, render.
    let state_for_read = state.clone();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    handle_server_frame(&state_for_read, &text);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Blocking thread for rustyline (synchronous readline).
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let state_for_prompt = state.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            let prompt = {
                let state = state_for_prompt.lock().expect("session state poisoned");
                crate::ui::prompt(state.current_channel.as_deref())
            };
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Task: parse input lines, encode frames, send.
    let state_for_write = state.clone();
    let mut write_task = tokio::spawn(async move {
        let mut seq: u64 = 0;
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let input = match parse_input(&line) {
                Ok(input) => input,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            let frame = {
                let state = state_for_write.lock().expect("session state poisoned");
                match encode_input(&input, &mut seq, state.current_channel.as_deref()) {
                    EncodedInput::Frame(frame) => frame,
                    EncodedInput::Quit => break,
                    EncodedInput::Print(text) => {
                        println!("{}", text);
                        continue;
                    }
                }
            };

            if let Err(e) = write.send(Message::Text(frame.into())).await {
                tracing::warn!("Failed to send frame: {}", e);
                write_error = true;
                break;
            }
        }

        // Normal exit: try to close the connection politely.
        if !write_error {
            let _ = write.send(Message::Close(None)).await;
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}

/// Outcome of turning one parsed input into wire traffic.
enum EncodedInput {
    Frame(String),
    Print(String),
    Quit,
}

fn encode_input(
    input: &ReplInput,
    seq: &mut u64,
    current_channel: Option<&str>,
) -> EncodedInput {
    let mut next_seq = || {
        *seq += 1;
        *seq
    };

    match input {
        ReplInput::Join { channel } => {
            EncodedInput::Frame(json!([next_seq(), "JOIN", channel]).to_string())
        }
        ReplInput::Leave { channel } => {
            let target = channel.as_deref().or(current_channel);
            match target {
                Some(target) => {
                    EncodedInput::Frame(json!([next_seq(), "LEAVE", target]).to_string())
                }
                None => EncodedInput::Print("not in a channel".to_string()),
            }
        }
        ReplInput::Msg { target, text } => {
            EncodedInput::Frame(json!([next_seq(), "MSG", target, text]).to_string())
        }
        ReplInput::Ping { payload } => {
            EncodedInput::Frame(json!([next_seq(), "PING", payload]).to_string())
        }
        ReplInput::Say { text } => match current_channel {
            Some(channel) => {
                EncodedInput::Frame(json!([next_seq(), "MSG", channel, text]).to_string())
            }
            None => EncodedInput::Print("not in a channel (try /join)".to_string()),
        },
        ReplInput::Help => EncodedInput::Print(HELP_TEXT.to_string()),
        ReplInput::Quit => EncodedInput::Quit,
    }
}

/// Decode and render one server frame, updating the session state.
fn handle_server_frame(state: &SharedState, text: &str) {
    let event = match wire::decode_server_event(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Undecodable server frame: {}", e);
            return;
        }
    };

    let mut state = state.lock().expect("session state poisoned");
    let formatted = match &event {
        ServerEvent::Ident { user_id } => {
            state.user_id = Some(user_id.clone());
            MessageFormatter::format_ident(user_id)
        }
        ServerEvent::Joined { source, channel } => {
            if state.user_id.as_deref() == Some(source.as_str()) {
                state.current_channel = Some(channel.clone());
            }
            MessageFormatter::format_joined(source, channel, state.user_id.as_deref())
        }
        ServerEvent::Left {
            source,
            channel,
            reason,
        } => {
            if state.user_id.as_deref() == Some(source.as_str())
                && state.current_channel.as_deref() == Some(channel.as_str())
            {
                state.current_channel = None;
            }
            MessageFormatter::format_left(
                source,
                channel,
                reason.as_deref(),
                state.user_id.as_deref(),
            )
        }
        ServerEvent::Message { source, payload } => {
            MessageFormatter::format_message(source, payload, Local::now())
        }
        ServerEvent::Pong { payload, .. } => MessageFormatter::format_pong(payload),
        ServerEvent::Error { code, target, .. } => {
            MessageFormatter::format_error(code, target.as_deref())
        }
        ServerEvent::Other(_) => MessageFormatter::format_raw(text),
    };

    print!("\n{}", formatted);
    redisplay_prompt(state.current_channel.as_deref());
}
