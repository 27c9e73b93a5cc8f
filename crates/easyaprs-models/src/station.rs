//! Station identity types.
//!
//! APRS-IS distinguishes the callsign used to authenticate the session from
//! the callsign that appears as the packet source. Both are normalised to
//! uppercase on construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// Callsign
// ---------------------------------------------------------------------------

/// A trimmed, uppercased amateur-radio callsign, optionally with an SSID
/// suffix (e.g. `"9M2PJU-10"`).
///
/// Use [`TryFrom`] or [`FromStr`] for validated construction.
///
/// # Examples
///
/// ```
/// use easyaprs_models::Callsign;
///
/// let cs: Callsign = " 9m2pju-10 ".parse().unwrap();
/// assert_eq!(cs.as_str(), "9M2PJU-10");
/// assert_eq!(cs.base(), "9M2PJU");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Callsign(String);

impl Callsign {
    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The callsign without its SSID suffix.
    pub fn base(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    fn normalise(s: &str) -> Result<String, ModelError> {
        let value = s.trim().to_ascii_uppercase();
        if value.is_empty() {
            return Err(ModelError::InvalidCallsign {
                value,
                reason: "must not be empty".to_string(),
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(ModelError::InvalidCallsign {
                value,
                reason: "may only contain letters, digits and '-'".to_string(),
            });
        }
        Ok(value)
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Callsign {
    type Error = ModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(Self(Self::normalise(s)?))
    }
}

impl TryFrom<String> for Callsign {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl From<Callsign> for String {
    fn from(c: Callsign) -> Self {
        c.0
    }
}

impl FromStr for Callsign {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

// ---------------------------------------------------------------------------
// StationIdentity
// ---------------------------------------------------------------------------

/// The login callsign (authentication) and beacon callsign (packet source).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StationIdentity {
    /// Callsign presented in the `user` login line.
    pub login: Callsign,
    /// Callsign placed in the source field of every packet.
    pub beacon: Callsign,
}

impl StationIdentity {
    /// Build an identity; the beacon callsign defaults to the login callsign.
    pub fn new(login: Callsign, beacon: Option<Callsign>) -> Self {
        let beacon = beacon.unwrap_or_else(|| login.clone());
        Self { login, beacon }
    }
}
