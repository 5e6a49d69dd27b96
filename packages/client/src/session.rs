//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use classchat_server::infrastructure::dto::websocket::OutboundEvent;

use crate::{
    domain::{Input, parse_input},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

/// Run one WebSocket client session until the user quits or the connection drops
pub async fn run_client_session(url: &str, label: &str) -> Result<(), ClientError> {
    let (ws_stream, _response) = match connect_async(url).await {
        Ok(result) => result,
        Err(tungstenite::Error::Http(response)) => {
            return Err(ClientError::HandshakeRejected(response.status().as_u16()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to chat server!");
    print!("{}", MessageFormatter::format_connected(label));

    let (mut write, mut read) = ws_stream.split();

    // Spawn a task to handle incoming messages
    let label_for_read = label.to_string();
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    let formatted = match OutboundEvent::decode(text.as_str()) {
                        Ok(event) => MessageFormatter::format_event(&event),
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    };
                    print!("{}", formatted);
                    redisplay_prompt(&label_for_read);
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

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt = format!("{}> ", label);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
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

    // Spawn a task to turn input lines into events and send them
    let label_for_write = label.to_string();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            let event = match parse_input(&line) {
                Input::Send(event) => event,
                Input::Help => {
                    print!("{}", MessageFormatter::format_help());
                    redisplay_prompt(&label_for_write);
                    continue;
                }
                Input::Invalid(reason) => {
                    print!("{}", MessageFormatter::format_error(&reason));
                    redisplay_prompt(&label_for_write);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(event.encode().into())).await {
                tracing::warn!("Failed to send message: {}", e);
                write_error = true;
                break;
            }
        }

        let _ = write.close().await;
        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            if read_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            if write_result.unwrap_or(false) {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}
