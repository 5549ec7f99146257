//! Two-part command key.
//!
//! Key format: `subsystem/action`
//!
//! Known subsystems:
//! - `command-control` - Device, network and clock operations
//! - `audio` - Speaker, microphone and audio fence
//! - `camera` - Camera modes, video fence and framing

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Selects one remote operation behind the generic dispatch method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandKey {
    subsystem: String,
    action: String,
}

impl CommandKey {
    /// Create a new key.
    pub fn new(subsystem: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            subsystem: subsystem.into(),
            action: action.into(),
        }
    }

    /// The subsystem (e.g., "command-control", "camera").
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// The action within the subsystem.
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subsystem, self.action)
    }
}

impl FromStr for CommandKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (subsystem, action) = s
            .split_once('/')
            .ok_or_else(|| KeyParseError::MissingSeparator(s.to_string()))?;

        if subsystem.is_empty() {
            return Err(KeyParseError::EmptySubsystem);
        }
        if action.is_empty() {
            return Err(KeyParseError::EmptyAction);
        }

        Ok(Self::new(subsystem, action))
    }
}

impl TryFrom<String> for CommandKey {
    type Error = KeyParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CommandKey> for String {
    fn from(key: CommandKey) -> Self {
        key.to_string()
    }
}

/// Error parsing a command key string.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KeyParseError {
    #[error("command key must contain '/' separator, got: {0}")]
    MissingSeparator(String),
    #[error("command key subsystem cannot be empty")]
    EmptySubsystem,
    #[error("command key action cannot be empty")]
    EmptyAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_control() {
        let key: CommandKey = "command-control/get-device-info".parse().unwrap();
        assert_eq!(key.subsystem(), "command-control");
        assert_eq!(key.action(), "get-device-info");
    }

    #[test]
    fn parse_keeps_later_separators_in_action() {
        let key: CommandKey = "camera/fence/status".parse().unwrap();
        assert_eq!(key.subsystem(), "camera");
        assert_eq!(key.action(), "fence/status");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(
            "no-separator".parse::<CommandKey>(),
            Err(KeyParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            "/action".parse::<CommandKey>(),
            Err(KeyParseError::EmptySubsystem)
        ));
        assert!(matches!(
            "audio/".parse::<CommandKey>(),
            Err(KeyParseError::EmptyAction)
        ));
    }

    #[test]
    fn serde_uses_display_form() {
        let key = CommandKey::new("audio", "set-speaker-volume");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"audio/set-speaker-volume\"");
        let back: CommandKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
