//! Client-side identifiers using type-prefixed ULIDs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

const PREFIX: &str = "REG";

/// Reference stamped on every registration submission so that a retried
/// submission can be matched to the first attempt on the server side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientReference(Ulid);

impl ClientReference {
    /// Create a new reference
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// The underlying ULID
    pub fn ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for ClientReference {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", PREFIX, self.0)
    }
}

/// Errors that can occur when parsing a reference
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Missing '-' separator in reference: {0}")]
    MissingSeparator(String),

    #[error("Unknown reference prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid ULID: {0}")]
    InvalidUlid(String),
}

impl FromStr for ClientReference {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingSeparator(s.to_string()))?;
        if !prefix.eq_ignore_ascii_case(PREFIX) {
            return Err(IdParseError::InvalidPrefix(prefix.to_string()));
        }
        let ulid = Ulid::from_string(rest).map_err(|_| IdParseError::InvalidUlid(rest.to_string()))?;
        Ok(Self(ulid))
    }
}

impl Serialize for ClientReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClientReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
