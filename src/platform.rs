//! Runtime platform detection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host operating system, as used for command selection
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
    Other,
}

impl Platform {
    /// Detect the platform this process is running on.
    ///
    /// Evaluated once at startup and passed along; never re-queried.
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    fn from_os_name(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::Darwin,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Windows => "windows",
            Platform::Darwin => "darwin",
            Platform::Linux => "linux",
            Platform::Other => "other",
        };
        write!(f, "{}", name)
    }
}
