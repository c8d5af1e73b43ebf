//! Command wire format
//!
//! A command travels as one text line: `Name key=value key=value`. Keys and
//! values are percent-escaped so spaces, `=`, `%` and newlines survive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::{Result, TacticsError};

const TILE_INDEX_KEY: &str = "TileIndex";

/// Every player intent, plus the two session messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    StartTurn,
    /// `-1` clears the selection
    SelectHex { tile_index: i32 },
    SelectUnit,
    SelectFirstUnit,
    SelectLastUnit,
    SelectPreviousUnit,
    SelectNextUnit,
    MoveUnit,
    ConfirmMove,
    Attack,
    ConfirmAttack,
    CancelMove,
    EndTurn,
    ConfirmEnd,
    CancelEnd,
    /// The remote peer has finished loading
    PlayerReady,
    /// The remote peer has left the match
    PlayerQuit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartTurn => "StartTurn",
            Command::SelectHex { .. } => "SelectHex",
            Command::SelectUnit => "SelectUnit",
            Command::SelectFirstUnit => "SelectFirstUnit",
            Command::SelectLastUnit => "SelectLastUnit",
            Command::SelectPreviousUnit => "SelectPreviousUnit",
            Command::SelectNextUnit => "SelectNextUnit",
            Command::MoveUnit => "MoveUnit",
            Command::ConfirmMove => "ConfirmMove",
            Command::Attack => "Attack",
            Command::ConfirmAttack => "ConfirmAttack",
            Command::CancelMove => "CancelMove",
            Command::EndTurn => "EndTurn",
            Command::ConfirmEnd => "ConfirmEnd",
            Command::CancelEnd => "CancelEnd",
            Command::PlayerReady => "PlayerReady",
            Command::PlayerQuit => "PlayerQuit",
        }
    }

    pub fn to_record(&self) -> CommandRecord {
        let mut record = CommandRecord::new(self.name());
        if let Command::SelectHex { tile_index } = self {
            record.args.insert(TILE_INDEX_KEY.to_string(), tile_index.to_string());
        }
        record
    }

    pub fn from_record(record: &CommandRecord) -> Result<Self> {
        let command = match record.name.as_str() {
            "StartTurn" => Command::StartTurn,
            "SelectHex" => {
                let tile_index = match record.args.get(TILE_INDEX_KEY) {
                    Some(value) => value.parse::<i32>().map_err(|_| {
                        TacticsError::MalformedCommand(format!("bad {} '{}'", TILE_INDEX_KEY, value))
                    })?,
                    None => -1,
                };
                Command::SelectHex { tile_index }
            }
            "SelectUnit" => Command::SelectUnit,
            "SelectFirstUnit" => Command::SelectFirstUnit,
            "SelectLastUnit" => Command::SelectLastUnit,
            "SelectPreviousUnit" => Command::SelectPreviousUnit,
            "SelectNextUnit" => Command::SelectNextUnit,
            "MoveUnit" => Command::MoveUnit,
            "ConfirmMove" => Command::ConfirmMove,
            "Attack" => Command::Attack,
            "ConfirmAttack" => Command::ConfirmAttack,
            "CancelMove" => Command::CancelMove,
            "EndTurn" => Command::EndTurn,
            "ConfirmEnd" => Command::ConfirmEnd,
            "CancelEnd" => Command::CancelEnd,
            "PlayerReady" => Command::PlayerReady,
            "PlayerQuit" => Command::PlayerQuit,
            other => return Err(TacticsError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_record())
    }
}

impl FromStr for Command {
    type Err = TacticsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_record(&s.parse()?)
    }
}

/// Name plus flat string arguments; the untyped form of a command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub name: String,
    pub args: BTreeMap<String, String>,
}

impl CommandRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for CommandRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", escape(&self.name))?;
        for (key, value) in &self.args {
            write!(f, " {}={}", escape(key), escape(value))?;
        }
        Ok(())
    }
}

impl FromStr for CommandRecord {
    type Err = TacticsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut tokens = s.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| TacticsError::MalformedCommand("empty command".into()))?;
        let mut record = CommandRecord::new(unescape(name)?);

        for token in tokens {
            let (key, value) = token.split_once('=').ok_or_else(|| {
                TacticsError::MalformedCommand(format!("argument '{}' has no '='", token))
            })?;
            record.args.insert(unescape(key)?, unescape(value)?);
        }
        Ok(record)
    }
}

/// Percent-escape the characters that would break the line format
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '=' => out.push_str("%3D"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse of [`escape`]
pub fn unescape(text: &str) -> Result<String> {
    let mut bytes = Vec::with_capacity(text.len());
    let raw = text.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = text
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| TacticsError::MalformedCommand(format!("bad escape in '{}'", text)))?;
            bytes.push(hex);
            i += 3;
        } else {
            bytes.push(raw[i]);
            i += 1;
        }
    }
    String::from_utf8(bytes)
        .map_err(|_| TacticsError::MalformedCommand(format!("invalid UTF-8 in '{}'", text)))
}
