//! UI utilities for the client.

use std::io::Write;

pub const PROMPT: &str = "antenna> ";

pub const HELP: &str = "\
Commands:
  seat <profile>                 take a seat with one of your profiles
  withdraw                       leave your seat
  start                          start the game (room creator only)
  accept | pass                  answer the storyteller appointment
  action <hand> <arena> [target] play a card
  end                            end your storytelling
  queue                          ask for a turn
  say <text>                     comment in the room log
  help                           show this list
  /quit                          leave
";

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}
