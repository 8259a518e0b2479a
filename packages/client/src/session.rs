//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, protocol::Message},
};

use crate::{
    command::{Command, parse_command},
    error::ClientError,
    formatter::MessageFormatter,
    ui::{HELP, redisplay_prompt},
};

/// Append the session token as the `token` query parameter.
pub fn channel_url(url: &str, token: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", url, separator, token)
}

/// Run one connection to a room channel.
///
/// Returns `Ok` when the user quits, and an error when the connection is
/// refused or lost.
pub async fn run_client_session(
    url: &str,
    token: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let ws_stream = match connect_async(channel_url(url, token)).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(WsError::Http(response)) => {
            return Err(ClientError::Rejected(response.status().as_u16()));
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to {}", url);
    println!("\nType 'help' for the command list, '/quit' to leave.\n");

    let (mut write, mut read) = ws_stream.split();

    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format(&text));
                    redisplay_prompt();
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    let input_loop = async {
        while let Some(line) = input_rx.recv().await {
            let message = match parse_command(&line) {
                Ok(Command::Send(message)) => message,
                Ok(Command::Help) => {
                    print!("{}", HELP);
                    redisplay_prompt();
                    continue;
                }
                Ok(Command::Quit) => break,
                Err(e) => {
                    println!("{}", e);
                    redisplay_prompt();
                    continue;
                }
            };

            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                return Err(ClientError::ConnectionError(e.to_string()));
            }
        }

        write.send(Message::Close(None)).await.ok();
        Ok(())
    };

    // If either side finishes, stop the other
    tokio::select! {
        _ = &mut read_task => Err(ClientError::ConnectionError("Connection lost".to_string())),
        result = input_loop => {
            read_task.abort();
            result
        }
    }
}
