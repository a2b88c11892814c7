//! Identifier types used throughout the Kartei client core.
//!
//! Both identifiers are numeric ids assigned by the server. Instance ids are
//! unique across all records; property ids are unique only within one type's
//! definition.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an instance (one business record).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Creates an instance ID from a raw numeric id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Parses an instance ID from its decimal string form.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| Error::InvalidInstanceId(s.to_string()))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InstanceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Identifier of one property within a type's definition.
///
/// The wire format keys raw instance properties by this id (as a string);
/// decoded instances re-key them by property title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(u32);

impl PropertyId {
    /// Creates a property ID from a raw numeric id.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Parses a property ID from its decimal string form.
    pub fn parse(s: &str) -> Result<Self> {
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| Error::InvalidPropertyId(s.to_string()))
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PropertyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
