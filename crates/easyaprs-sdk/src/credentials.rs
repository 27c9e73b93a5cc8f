//! Login credentials and the APRS-IS login line.

use std::fmt;

use easyaprs_models::Callsign;
use serde::{Deserialize, Serialize};

/// Client software identification sent after `vers` in the login line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareId {
    /// Software name (no spaces).
    pub name: String,
    /// Software version (no spaces).
    pub version: String,
}

impl Default for SoftwareId {
    fn default() -> Self {
        Self {
            name: "ManualLogin".to_string(),
            version: "1.0".to_string(),
        }
    }
}

/// Callsign + passcode pair used to authenticate an APRS-IS session.
///
/// The passcode is kept out of `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Login callsign.
    pub callsign: Callsign,
    /// Numeric passcode, kept as text exactly as configured.
    pub passcode: String,
}

impl LoginCredentials {
    pub fn new(callsign: Callsign, passcode: impl Into<String>) -> Self {
        Self {
            callsign,
            passcode: passcode.into(),
        }
    }

    /// `user {CALLSIGN} pass {PASSCODE} vers {name} {version}\r\n`
    pub fn login_line(&self, software: &SoftwareId) -> String {
        format!(
            "user {} pass {} vers {} {}\r\n",
            self.callsign, self.passcode, software.name, software.version
        )
    }

    /// The login line with the passcode masked, for logs.
    pub fn redacted_login_line(&self, software: &SoftwareId) -> String {
        format!(
            "user {} pass ***** vers {} {}",
            self.callsign, software.name, software.version
        )
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("callsign", &self.callsign)
            .field("passcode", &"*****")
            .finish()
    }
}
