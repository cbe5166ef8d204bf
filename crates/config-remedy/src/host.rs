//! Host descriptor: the device a configuration tree belongs to

use crate::options::Options;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Network operating system identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    /// Cisco IOS / IOS-XE
    Ios,
    /// Arista EOS
    Eos,
    /// Cisco NX-OS
    Nxos,
    /// Cisco IOS-XR
    Iosxr,
    /// Any other OS identifier, carried verbatim
    Other(String),
}

impl Os {
    /// Canonical identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ios => "ios",
            Self::Eos => "eos",
            Self::Nxos => "nxos",
            Self::Iosxr => "iosxr",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for Os {
    fn from(value: &str) -> Self {
        match value {
            "ios" => Self::Ios,
            "eos" => Self::Eos,
            "nxos" => Self::Nxos,
            "iosxr" => Self::Iosxr,
            other => Self::Other(other.to_string()),
        }
    }
}

impl FromStr for Os {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value))
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Os {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Os {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// A device: hostname, OS identifier and remediation options
///
/// Immutable after construction; multiple configuration trees share one host.
#[derive(Debug, Clone, Deserialize)]
pub struct Host {
    /// Device hostname
    pub hostname: String,
    /// Operating system identifier
    pub os: Os,
    /// Remediation options, consumed read-only
    #[serde(default)]
    pub options: Options,
}

impl Host {
    /// Create a host descriptor.
    pub fn new(hostname: impl Into<String>, os: Os, options: Options) -> Self {
        Self {
            hostname: hostname.into(),
            os,
            options,
        }
    }
}
