//! Opaque identifier and value-object types shared across the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while constructing value objects.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("fingerprint must be non-empty")]
    EmptyFingerprint,

    #[error("session id must be non-empty")]
    EmptySessionId,

    #[error("config path must be non-empty")]
    EmptyConfigPath,

    #[error("invalid node target {0:?}: expected user@host[:port]")]
    InvalidNodeTarget(String),
}

/// Opaque non-empty string identifying a content-addressed build artifact.
///
/// Equality is plain string equality; the core never interprets the
/// contents beyond "non-empty".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Construct a fingerprint, rejecting empty strings.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyFingerprint);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque non-empty identifier for a persistent session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptySessionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token naming a declarative configuration; passed through to the
/// `BuildPort` without interpretation by the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigPath(String);

impl ConfigPath {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::EmptyConfigPath);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single fleet member reachable over the remote-exec transport.
///
/// Equality is by `(host, user, port)`; `display_name` is cosmetic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub display_name: Option<String>,
}

impl Node {
    pub const DEFAULT_PORT: u16 = 22;

    pub fn new(user: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            port,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Parse `user@host[:port]`, defaulting the port to 22.
    pub fn parse(target: &str) -> Result<Self, ValidationError> {
        let (user, rest) = target
            .split_once('@')
            .ok_or_else(|| ValidationError::InvalidNodeTarget(target.to_string()))?;
        if user.is_empty() || rest.is_empty() {
            return Err(ValidationError::InvalidNodeTarget(target.to_string()));
        }

        let (host, port) = match rest.split_once(':') {
            Some((host, port_str)) => {
                let port: u16 = port_str
                    .parse()
                    .map_err(|_| ValidationError::InvalidNodeTarget(target.to_string()))?;
                (host, port)
            }
            None => (rest, Self::DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(ValidationError::InvalidNodeTarget(target.to_string()));
        }

        Ok(Self::new(user, host, port))
    }

    /// Parse a comma-separated list of `user@host[:port]` targets.
    pub fn parse_targets(list: &str) -> Result<Vec<Self>, ValidationError> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.host == other.host && self.user == other.user && self.port == other.port
    }
}
impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.host.hash(state);
        self.user.hash(state);
        self.port.hash(state);
    }
}
