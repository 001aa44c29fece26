//!
//! # Model Configuration
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::utils::{enumstr, SerdeFile};

enumstr!(
    /// # Fan-In Policy
    ///
    /// Granularity at which two connection sinks are considered to drive the same pins.
    FanInPolicy {
        Bit: "BIT",
        Port: "PORT",
    }
);
impl Default for FanInPolicy {
    fn default() -> Self {
        Self::Bit
    }
}

/// # Module Configuration
///
/// Settings which alter the checks a [crate::Module] performs.
/// Not part of the module document; supplied alongside it, or loaded from its own file.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchConfig {
    /// Multiple-driver check granularity
    pub fan_in: FanInPolicy,
}
impl ArchConfig {
    /// Create a config with fan-in policy `fan_in`
    pub fn new(fan_in: FanInPolicy) -> Self {
        Self { fan_in }
    }
}
impl SerdeFile for ArchConfig {}
