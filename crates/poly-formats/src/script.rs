//! Command script: the token language of the host harness.
//!
//! ```text
//! voice 0 freq 1000 amp 255 ascale 8 en 1 time 32000
//! ```
//!
//! `voice N` picks the channel for the commands that follow. Every other
//! command takes one number and becomes one event. `end` stops parsing.

use poly_engine::{Event, EventKind};
use thiserror::Error;

/// Error from [`parse_script`], with the token index where it occurred.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("token {position}: unknown command `{command}`")]
    UnknownCommand { position: usize, command: String },
    #[error("token {position}: `{command}` needs a value")]
    MissingValue { position: usize, command: String },
    #[error("token {position}: `{token}` is not a number")]
    InvalidNumber { position: usize, token: String },
    #[error("token {position}: {value} does not fit in 16 bits")]
    OutOfRange { position: usize, value: i64 },
}

/// What a command word turns into.
enum Command {
    Voice,
    Global(EventKind),
    PerVoice(EventKind),
}

fn command(word: &str) -> Option<Command> {
    Some(match word {
        "voice" => Command::Voice,
        "time" => Command::Global(EventKind::Time),
        "en" => Command::Global(EventKind::Enable),
        "mute" => Command::Global(EventKind::Mute),
        "freq" => Command::PerVoice(EventKind::SetFrequency),
        "dfreq" => Command::PerVoice(EventKind::FrequencyStep),
        "pmod" => Command::PerVoice(EventKind::PhaseModSource),
        "amp" => Command::PerVoice(EventKind::SetAmplitude),
        "damp" => Command::PerVoice(EventKind::AmplitudeStep),
        "amod" => Command::PerVoice(EventKind::AmplitudeModSource),
        "ascale" => Command::PerVoice(EventKind::AmplitudeScale),
        "dscale" => Command::PerVoice(EventKind::StepInterval),
        _ => return None,
    })
}

/// Parse a decimal or `0x` hex number; negatives wrap to 16 bits.
fn parse_value(token: &str, position: usize) -> Result<u16, ScriptError> {
    let invalid = || ScriptError::InvalidNumber {
        position,
        token: token.to_string(),
    };
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // At most one leading `-`, and only before any radix prefix.
    if digits.starts_with(['+', '-']) {
        return Err(invalid());
    }
    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| invalid())?;
    let value = if negative { -magnitude } else { magnitude };

    if !(i16::MIN as i64..=u16::MAX as i64).contains(&value) {
        return Err(ScriptError::OutOfRange { position, value });
    }
    Ok(value as u16)
}

/// Turn a token list into events.
pub fn parse_script<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Event>, ScriptError> {
    let mut events = Vec::new();
    let mut channel: u8 = 0;
    let mut position = 0;

    while position < tokens.len() {
        let word = tokens[position].as_ref();
        if word == "end" {
            break;
        }
        let cmd = command(word).ok_or_else(|| ScriptError::UnknownCommand {
            position,
            command: word.to_string(),
        })?;

        let value_token = tokens.get(position + 1).ok_or_else(|| ScriptError::MissingValue {
            position,
            command: word.to_string(),
        })?;
        let value = parse_value(value_token.as_ref(), position + 1)?;

        match cmd {
            Command::Voice => {
                if value > 0x0f {
                    return Err(ScriptError::OutOfRange {
                        position: position + 1,
                        value: value as i64,
                    });
                }
                channel = value as u8;
            }
            Command::Global(kind) => events.push(Event::new(kind, 0, value)),
            Command::PerVoice(kind) => events.push(Event::new(kind, channel, value)),
        }
        position += 2;
    }

    Ok(events)
}

/// Parse whitespace-separated script text; `#` starts a comment to end of line.
pub fn parse_script_str(text: &str) -> Result<Vec<Event>, ScriptError> {
    let tokens: Vec<&str> = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .collect();
    parse_script(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poly_engine::ModSource;

    #[test]
    fn harness_example() {
        let events = parse_script(&[
            "voice", "0", "freq", "1000", "amp", "255", "ascale", "8", "en", "1", "time", "32000",
        ])
        .unwrap();
        assert_eq!(
            events,
            vec![
                Event::set_frequency(0, 1000),
                Event::set_amplitude(0, 255),
                Event::amplitude_scale(0, 8),
                Event::enable(1),
                Event::time(32_000),
            ]
        );
    }

    #[test]
    fn voice_applies_to_following_commands() {
        let events = parse_script(&["amp", "1", "voice", "3", "amp", "2", "dscale", "10"]).unwrap();
        assert_eq!(
            events,
            vec![
                Event::set_amplitude(0, 1),
                Event::set_amplitude(3, 2),
                Event::step_interval(3, 10),
            ]
        );
    }

    #[test]
    fn negative_values_wrap() {
        let events = parse_script(&["dfreq", "-5", "damp", "-1", "pmod", "-1"]).unwrap();
        assert_eq!(events[0], Event::frequency_step(0, -5));
        assert_eq!(events[1].value, 0xffff);
        assert_eq!(events[2], Event::phase_mod(0, ModSource::Disabled));
    }

    #[test]
    fn hex_values() {
        let events = parse_script(&["freq", "0xFFFF", "mute", "0x0f"]).unwrap();
        assert_eq!(events, vec![Event::set_frequency(0, 0xffff), Event::mute(0x0f)]);
    }

    #[test]
    fn end_stops_parsing() {
        let events = parse_script(&["en", "1", "end", "bogus"]).unwrap();
        assert_eq!(events, vec![Event::enable(1)]);
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_script(&["en", "1", "wobble", "3"]),
            Err(ScriptError::UnknownCommand {
                position: 2,
                command: "wobble".to_string()
            })
        );
    }

    #[test]
    fn missing_value() {
        assert_eq!(
            parse_script(&["time"]),
            Err(ScriptError::MissingValue {
                position: 0,
                command: "time".to_string()
            })
        );
    }

    #[test]
    fn invalid_number() {
        for token in ["loud", "--5", "0x-5", "+-1", "+5", "-0x+5", "", "-"] {
            assert_eq!(
                parse_script(&["time", token]),
                Err(ScriptError::InvalidNumber {
                    position: 1,
                    token: token.to_string()
                }),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn single_minus_before_hex() {
        assert_eq!(parse_script(&["dfreq", "-0x10"]).unwrap(), vec![Event::frequency_step(0, -16)]);
    }

    #[test]
    fn out_of_range_values() {
        assert_eq!(
            parse_script(&["time", "70000"]),
            Err(ScriptError::OutOfRange { position: 1, value: 70_000 })
        );
        assert!(matches!(
            parse_script(&["voice", "16"]),
            Err(ScriptError::OutOfRange { position: 1, .. })
        ));
    }

    #[test]
    fn text_with_comments() {
        let text = "# one second of A\nvoice 1 freq 440 # pitch\namp 100\n\nen 2 time 32000\n";
        let events = parse_script_str(text).unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Event::set_frequency(1, 440));
    }
}
