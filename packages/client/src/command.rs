//! Parsing of command lines typed at the prompt.

use antenna_server::infrastructure::dto::websocket::ClientMessage;

use crate::error::CommandError;

/// What a typed line asks the client to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Send a message to the room.
    Send(ClientMessage),
    Help,
    Quit,
}

/// Parse one trimmed, non-empty input line.
///
/// Nothing is sent for lines that fail to parse.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let message = match name {
        "/quit" => return Ok(Command::Quit),
        "help" => return Ok(Command::Help),
        "seat" => {
            let [profile_id] = integers::<1>(rest).ok_or(CommandError::Usage("seat <profile>"))?;
            ClientMessage::Seat { profile_id }
        }
        "withdraw" => ClientMessage::Withdraw,
        "start" => ClientMessage::Start,
        "accept" => ClientMessage::AppointmentAccept,
        "pass" => ClientMessage::AppointmentPass,
        "action" => {
            const USAGE: &str = "action <hand> <arena> [target]";
            let args = parse_all(rest).ok_or(CommandError::Usage(USAGE))?;
            match args.as_slice() {
                [hand_index, arena_index] => ClientMessage::Action {
                    hand_index: *hand_index,
                    arena_index: *arena_index,
                    target: None,
                },
                [hand_index, arena_index, target] => ClientMessage::Action {
                    hand_index: *hand_index,
                    arena_index: *arena_index,
                    target: Some(*target),
                },
                _ => return Err(CommandError::Usage(USAGE)),
            }
        }
        "end" => ClientMessage::StorytellingEnd,
        "queue" => ClientMessage::Queue,
        "say" if !rest.is_empty() => ClientMessage::Comment {
            text: rest.to_string(),
        },
        "say" => return Err(CommandError::Usage("say <text>")),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Command::Send(message))
}

fn parse_all(rest: &str) -> Option<Vec<i64>> {
    rest.split_whitespace()
        .map(|arg| arg.parse().ok())
        .collect()
}

fn integers<const N: usize>(rest: &str) -> Option<[i64; N]> {
    parse_all(rest)?.try_into().ok()
}
