//! Command messages and payload coercion

use std::fmt;

use ocula_core::{OculaError, OculaResult};
use serde::{Deserialize, Serialize};

/// Primitive command payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Bool(_) => "bool",
            Payload::Number(_) => "number",
            Payload::Text(_) => "string",
        }
    }

    /// Accepts a boolean or the text `true`/`false` in any case
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Payload::Bool(b) => Some(*b),
            Payload::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            Payload::Number(_) => None,
        }
    }

    /// Accepts a finite number or text that parses to one
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Payload::Number(n) => *n,
            Payload::Text(s) => s.trim().parse().ok()?,
            Payload::Bool(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Bool(b) => write!(f, "{b}"),
            Payload::Number(n) => write!(f, "{n}"),
            Payload::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Payload::Bool(value)
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Payload::Number(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Payload::Text(value.to_string())
    }
}

/// One command message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "command")]
    pub id: String,
    pub payload: Payload,
}

impl Command {
    pub fn new(id: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Command {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Decode `{"command": "...", "payload": ...}`
    pub fn from_json(bytes: &[u8]) -> OculaResult<Command> {
        serde_json::from_slice(bytes).map_err(|e| OculaError::Decode(e.to_string()))
    }

    pub fn to_json(&self) -> OculaResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| OculaError::Decode(e.to_string()))
    }

    pub(crate) fn malformed(&self, expected: &'static str) -> OculaError {
        OculaError::MalformedPayload {
            command: self.id.clone(),
            expected,
            found: self.payload.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Payload::Bool(true).as_bool(), Some(true));
        assert_eq!(Payload::from("TRUE").as_bool(), Some(true));
        assert_eq!(Payload::from(" false ").as_bool(), Some(false));
        assert_eq!(Payload::from("yes").as_bool(), None);
        assert_eq!(Payload::Number(1.0).as_bool(), None);
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Payload::Number(0.25).as_number(), Some(0.25));
        assert_eq!(Payload::from("1.5").as_number(), Some(1.5));
        assert_eq!(Payload::from("NaN").as_number(), None);
        assert_eq!(Payload::Bool(true).as_number(), None);
    }

    #[test]
    fn test_decode_message() {
        let cmd = Command::from_json(br#"{"command":"EnableEyeJitter","payload":false}"#).unwrap();
        assert_eq!(cmd, Command::new("EnableEyeJitter", false));

        let cmd = Command::from_json(br#"{"command":"X","payload":"true"}"#).unwrap();
        assert_eq!(cmd.payload, Payload::Text("true".to_string()));

        let cmd = Command::from_json(br#"{"command":"X","payload":3}"#).unwrap();
        assert_eq!(cmd.payload, Payload::Number(3.0));
    }

    #[test]
    fn test_decode_rejects_non_primitive() {
        assert!(matches!(
            Command::from_json(br#"{"command":"X","payload":[1,2]}"#),
            Err(OculaError::Decode(_))
        ));
        assert!(Command::from_json(br#"{"command":"X","payload":null}"#).is_err());
        assert!(Command::from_json(b"not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_shape() {
        let bytes = Command::new("ExTrackerEnable", true).to_json().unwrap();
        assert_eq!(bytes, br#"{"command":"ExTrackerEnable","payload":true}"#.to_vec());
    }
}
