//! Inbound reply decoding

use thiserror::Error;

/// Prefix the gateway puts in front of every return message
const RETURN_MESSAGE: char = '!';

/// Errors raised while decoding a reply line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty reply")]
    Empty,
    #[error("unknown reply status '{0}'")]
    UnknownStatus(char),
    #[error("reply has no value")]
    MissingValue,
    #[error("unknown value type '{0}'")]
    UnknownType(char),
    #[error("malformed {kind} value '{raw}'")]
    Malformed { kind: &'static str, raw: String },
}

/// A value carried by a reply
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Void,
    Null,
    Integer(i32),
    Long(i64),
    Double(f64),
    Boolean(bool),
    String(String),
    /// A value the client does not interpret: object references,
    /// collections, bytes and decimals. `id` is the raw payload.
    Reference { kind: char, id: String },
}

/// A decoded reply line
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Success(ReturnValue),
    Error(ReturnValue),
}

/// Decode one reply line. The trailing newline is optional.
pub fn decode_reply(line: &str) -> Result<Reply, ProtocolError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let line = line.strip_prefix(RETURN_MESSAGE).unwrap_or(line);

    let mut chars = line.chars();
    let status = chars.next().ok_or(ProtocolError::Empty)?;
    let payload = chars.as_str();

    match status {
        'y' => Ok(Reply::Success(decode_value(payload)?)),
        // An error without a payload still reports as an error.
        'x' if payload.is_empty() => Ok(Reply::Error(ReturnValue::Void)),
        'x' => Ok(Reply::Error(decode_value(payload)?)),
        other => Err(ProtocolError::UnknownStatus(other)),
    }
}

fn decode_value(payload: &str) -> Result<ReturnValue, ProtocolError> {
    let mut chars = payload.chars();
    let kind = chars.next().ok_or(ProtocolError::MissingValue)?;
    let raw = chars.as_str();

    let value = match kind {
        'v' => ReturnValue::Void,
        'n' => ReturnValue::Null,
        'i' => ReturnValue::Integer(parse(raw, "integer")?),
        'L' => ReturnValue::Long(parse(raw, "long")?),
        'd' => ReturnValue::Double(parse_double(raw)?),
        'b' => ReturnValue::Boolean(match raw {
            "true" => true,
            "false" => false,
            _ => {
                return Err(ProtocolError::Malformed {
                    kind: "boolean",
                    raw: raw.to_string(),
                });
            }
        }),
        's' => ReturnValue::String(unescape(raw)),
        'r' | 'l' | 'h' | 'a' | 't' | 'g' | 'f' | 'j' | 'D' | 'm' | 'u' | 'o' | 'c' | 'p' => {
            ReturnValue::Reference {
                kind,
                id: raw.to_string(),
            }
        }
        other => return Err(ProtocolError::UnknownType(other)),
    };

    Ok(value)
}

fn parse<T: std::str::FromStr>(raw: &str, kind: &'static str) -> Result<T, ProtocolError> {
    raw.parse().map_err(|_| ProtocolError::Malformed {
        kind,
        raw: raw.to_string(),
    })
}

fn parse_double(raw: &str) -> Result<f64, ProtocolError> {
    match raw {
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => parse(raw, "double"),
    }
}

/// Reverse [`escape`](crate::escape)
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape;

    #[test]
    fn void_success() {
        assert_eq!(decode_reply("!yv\n").unwrap(), Reply::Success(ReturnValue::Void));
        // Older gateways omit the return message prefix.
        assert_eq!(decode_reply("yv").unwrap(), Reply::Success(ReturnValue::Void));
    }

    #[test]
    fn typed_success_values() {
        assert_eq!(
            decode_reply("!yi42").unwrap(),
            Reply::Success(ReturnValue::Integer(42))
        );
        assert_eq!(
            decode_reply("!yd12.5").unwrap(),
            Reply::Success(ReturnValue::Double(12.5))
        );
        assert_eq!(
            decode_reply("!ybfalse").unwrap(),
            Reply::Success(ReturnValue::Boolean(false))
        );
        assert_eq!(
            decode_reply("!yro12").unwrap(),
            Reply::Success(ReturnValue::Reference {
                kind: 'r',
                id: "o12".to_string()
            })
        );
    }

    #[test]
    fn error_with_message() {
        let reply =
            decode_reply("!xspy4j.Py4JException: Method foo([]) does not exist\\n\tat x\n").unwrap();
        assert_eq!(
            reply,
            Reply::Error(ReturnValue::String(
                "py4j.Py4JException: Method foo([]) does not exist\n\tat x".to_string()
            ))
        );
        assert_eq!(decode_reply("!x").unwrap(), Reply::Error(ReturnValue::Void));
    }

    #[test]
    fn malformed_replies() {
        assert_eq!(decode_reply("\n"), Err(ProtocolError::Empty));
        assert_eq!(decode_reply("!qv"), Err(ProtocolError::UnknownStatus('q')));
        assert_eq!(decode_reply("!y"), Err(ProtocolError::MissingValue));
        assert_eq!(decode_reply("!yZ1"), Err(ProtocolError::UnknownType('Z')));
        assert!(matches!(
            decode_reply("!yiabc"),
            Err(ProtocolError::Malformed { kind: "integer", .. })
        ));
    }

    #[test]
    fn unescape_reverses_escape() {
        let raw = "line one\nline\\two\r";
        assert_eq!(unescape(&escape(raw)), raw);
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }
}
