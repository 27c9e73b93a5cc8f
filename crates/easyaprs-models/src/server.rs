//! APRS-IS server candidates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default APRS-IS user-defined-filter port.
pub const DEFAULT_APRS_IS_PORT: u16 = 14580;

/// One APRS-IS server to try, in failover order.
///
/// # Examples
///
/// ```
/// use easyaprs_models::ServerCandidate;
///
/// let s = ServerCandidate::new("rotate.aprs.net", 14580);
/// assert_eq!(s.to_string(), "rotate.aprs.net:14580");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerCandidate {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_APRS_IS_PORT
}

impl ServerCandidate {
    /// Create a new candidate.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The built-in failover list used when none is configured.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("aprs.hamradio.my", DEFAULT_APRS_IS_PORT),
            Self::new("rotate.aprs.net", DEFAULT_APRS_IS_PORT),
        ]
    }
}

impl fmt::Display for ServerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
