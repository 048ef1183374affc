//! Parsing of interactive input lines.

use anyhow::{Context, bail};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Ask the server for all of its files.
    Files,
    /// Report network quality derived from measured bandwidth in kbps.
    Quality { down_kbps: u32, up_kbps: u32 },
    State,
    Connect,
    Disconnect,
    Quit,
    Help,
    Chat(String),
    Empty,
}

pub const HELP: &str = "\
commands:
  /files                      request all files from the server
  /quality <down> <up>        report network quality from bandwidth in kbps
  /state                      show the connection state
  /connect                    connect (or reconnect) to the configured server
  /disconnect                 close the connection
  /quit                       exit
  anything else               send as a chat message";

pub fn parse_line(line: &str) -> anyhow::Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if !line.starts_with('/') {
        return Ok(Input::Chat(line.to_string()));
    }

    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let input = match command {
        "/files" => Input::Files,
        "/quality" => {
            let (Some(down), Some(up)) = (words.next(), words.next()) else {
                bail!("usage: /quality <down_kbps> <up_kbps>");
            };
            Input::Quality {
                down_kbps: down.parse().with_context(|| format!("invalid bandwidth {down:?}"))?,
                up_kbps: up.parse().with_context(|| format!("invalid bandwidth {up:?}"))?,
            }
        }
        "/state" => Input::State,
        "/connect" => Input::Connect,
        "/disconnect" => Input::Disconnect,
        "/quit" | "/exit" => Input::Quit,
        "/help" => Input::Help,
        other => bail!("unknown command {other}, try /help"),
    };

    if words.next().is_some() {
        bail!("too many arguments for {command}");
    }
    Ok(input)
}
