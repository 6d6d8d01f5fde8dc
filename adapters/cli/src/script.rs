//! Scripted input: one whitespace-separated token per tick.
//!
//! `u`, `d`, `l` and `r` hold a direction, `s` holds the sword and the two
//! combine (`us`). `.` idles. Keyboard names go in angle brackets joined by
//! `+`, so `<w+space>` holds the same keys as `us`. Any token may repeat
//! with `*N`.

use room_crawl_core::{Direction, PlayerIntent};
use room_crawl_system_control::{HeldKeys, Key};
use thiserror::Error;

/// Reasons a script cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ScriptError {
    #[error("token `{token}` contains unknown symbol `{symbol}`")]
    UnknownSymbol { token: String, symbol: char },
    #[error("token `{token}` names unknown key `{name}`")]
    UnknownKey { token: String, name: String },
    #[error("token `{token}` holds more than one direction")]
    ConflictingDirections { token: String },
    #[error("token `{token}` holds the sword twice")]
    RepeatedSword { token: String },
    #[error("token `{token}` has an invalid repeat count")]
    BadRepeat { token: String },
    #[error("token `{token}` holds nothing; use `.` to idle")]
    Empty { token: String },
}

/// Intents to feed the session, one per tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Script {
    intents: Vec<PlayerIntent>,
}

impl Script {
    pub(crate) fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut intents = Vec::new();
        for token in source.split_whitespace() {
            let (body, repeat) = match token.split_once('*') {
                Some((body, count)) => match count.parse::<usize>() {
                    Ok(count) if count > 0 => (body, count),
                    _ => {
                        return Err(ScriptError::BadRepeat {
                            token: token.to_owned(),
                        })
                    }
                },
                None => (token, 1),
            };
            let intent = parse_body(token, body)?;
            intents.extend(std::iter::repeat(intent).take(repeat));
        }
        Ok(Self { intents })
    }

    /// Intent for the zero-based tick, idling once the script runs out.
    pub(crate) fn intent(&self, tick: usize) -> PlayerIntent {
        self.intents
            .get(tick)
            .copied()
            .unwrap_or(PlayerIntent::IDLE)
    }

    pub(crate) fn len(&self) -> usize {
        self.intents.len()
    }
}

fn parse_body(token: &str, body: &str) -> Result<PlayerIntent, ScriptError> {
    if body == "." {
        return Ok(PlayerIntent::IDLE);
    }
    if body.is_empty() {
        return Err(ScriptError::Empty {
            token: token.to_owned(),
        });
    }

    let keys = match body.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
        Some(names) => named_keys(token, names)?,
        None => symbol_keys(token, body)?,
    };

    let mut held = HeldKeys::new();
    let mut direction_held = false;
    let mut sword_held = false;
    for key in keys {
        let already = match key {
            Key::Direction(_) => std::mem::replace(&mut direction_held, true),
            Key::Sword => std::mem::replace(&mut sword_held, true),
        };
        if already {
            let token = token.to_owned();
            return Err(match key {
                Key::Direction(_) => ScriptError::ConflictingDirections { token },
                Key::Sword => ScriptError::RepeatedSword { token },
            });
        }
        held.press(key);
    }
    Ok(held.intent())
}

fn symbol_keys(token: &str, body: &str) -> Result<Vec<Key>, ScriptError> {
    body.chars()
        .map(|symbol| match symbol {
            'u' => Ok(Key::Direction(Direction::Up)),
            'd' => Ok(Key::Direction(Direction::Down)),
            'l' => Ok(Key::Direction(Direction::Left)),
            'r' => Ok(Key::Direction(Direction::Right)),
            's' => Ok(Key::Sword),
            _ => Err(ScriptError::UnknownSymbol {
                token: token.to_owned(),
                symbol,
            }),
        })
        .collect()
}

fn named_keys(token: &str, names: &str) -> Result<Vec<Key>, ScriptError> {
    names
        .split('+')
        .map(|name| {
            Key::from_name(name).ok_or_else(|| ScriptError::UnknownKey {
                token: token.to_owned(),
                name: name.to_owned(),
            })
        })
        .collect()
}
