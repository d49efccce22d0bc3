//! Connection role classification

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RelayError;

/// Role a connection declares when it registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Connected but not yet registered
    #[default]
    Unknown,
    /// Executes commands
    Phone,
    /// Issues commands
    Controller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Unknown => "unknown",
            Role::Phone => "phone",
            Role::Controller => "controller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only the two declarable roles parse; `unknown` is never assignable.
impl FromStr for Role {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(Role::Phone),
            "controller" => Ok(Role::Controller),
            other => Err(RelayError::InvalidRole(other.to_string())),
        }
    }
}

/// What happens when an already-registered connection registers again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// The most recent registration overwrites the role
    #[default]
    LastWins,
    /// The first registration sticks; later ones are no-ops
    FirstWins,
}

impl FromStr for RegistrationPolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-wins" | "last_wins" | "last" => Ok(RegistrationPolicy::LastWins),
            "first-wins" | "first_wins" | "first" => Ok(RegistrationPolicy::FirstWins),
            other => Err(RelayError::Config(format!(
                "unknown registration policy '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarable_roles() {
        assert_eq!("phone".parse::<Role>().unwrap(), Role::Phone);
        assert_eq!("controller".parse::<Role>().unwrap(), Role::Controller);
    }

    #[test]
    fn test_unknown_role_is_not_assignable() {
        assert!(matches!(
            "unknown".parse::<Role>(),
            Err(RelayError::InvalidRole(r)) if r == "unknown"
        ));
        assert!("Phone".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Controller).unwrap(), "\"controller\"");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "first-wins".parse::<RegistrationPolicy>().unwrap(),
            RegistrationPolicy::FirstWins
        );
        assert_eq!(
            "LAST-WINS".parse::<RegistrationPolicy>().unwrap(),
            RegistrationPolicy::LastWins
        );
        assert!("sometimes".parse::<RegistrationPolicy>().is_err());
    }
}
