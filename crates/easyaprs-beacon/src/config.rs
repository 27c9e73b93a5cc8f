//! Beacon configuration.
//!
//! The configuration file is JSON. It uses the same field names and layout as
//! the supervisor's `config.yaml` (flat main-station fields, a `beacons` list
//! of objects and an `aprs_servers` failover list), but a YAML file has to be
//! converted before it can be loaded here. [`RawConfig`] mirrors the file
//! one-to-one; [`BeaconConfig`] is the validated form the rest of the program
//! uses.
//!
//! | Source                        | Meaning                                   |
//! |-------------------------------|-------------------------------------------|
//! | `--config <PATH>`             | explicit file                             |
//! | `EASYAPRS_CONFIG`             | explicit file when no flag is given       |
//! | `./easyaprs.json`             | first default location                    |
//! | `<config_dir>/easyaprs/config.json` | second default location             |

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use easyaprs_models::{
    passcode_for, BeaconTarget, Callsign, Interval, ModelError, Position, ServerCandidate,
    StationIdentity, Symbol,
};
use easyaprs_sdk::{LoginCredentials, SessionOptions, SoftwareId};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

const APP_DIR: &str = "easyaprs";
const LOCAL_CONFIG_FILE: &str = "easyaprs.json";
const USER_CONFIG_FILE: &str = "config.json";

/// Configuration failures. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration file found (tried {})", display_paths(.tried))]
    NotFound { tried: Vec<PathBuf> },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{field}: {source}")]
    Invalid {
        field: String,
        #[source]
        source: ModelError,
    },

    #[error("passcode is required unless dry_run is enabled")]
    MissingPasscode,

    #[error("at least one APRS-IS server is required")]
    NoServers,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

/// One entry of the `beacons` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default = "default_symbol_table")]
    pub symbol_table: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
}

/// The configuration file as written on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub beacon_callsign: Option<String>,
    #[serde(default, deserialize_with = "passcode_text")]
    pub passcode: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default = "default_symbol_table")]
    pub symbol_table: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub staggered: bool,
    #[serde(default)]
    pub beacons: Vec<RawObject>,
    #[serde(default = "ServerCandidate::defaults")]
    pub aprs_servers: Vec<ServerCandidate>,
    #[serde(default)]
    pub software: Option<SoftwareId>,
}

fn default_symbol_table() -> String {
    "/".to_string()
}

fn default_symbol() -> String {
    "r".to_string()
}

fn default_interval() -> u32 {
    10
}

/// Accept the passcode as either a JSON string or a number.
fn passcode_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Num(i64),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::Str(s)) => s.trim().to_string(),
        Some(Text::Num(n)) => n.to_string(),
        None => String::new(),
    })
}

impl RawConfig {
    /// Find and parse the configuration file.
    ///
    /// An explicit path is used as-is; otherwise the default locations are
    /// searched in order.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidates = default_locations();
                candidates
                    .iter()
                    .find(|p| p.exists())
                    .cloned()
                    .ok_or(ConfigError::NotFound { tried: candidates })?
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let raw = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "configuration loaded");
        Ok(raw)
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join(APP_DIR).join(USER_CONFIG_FILE));
    }
    paths
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct BeaconConfig {
    pub identity: StationIdentity,
    pub passcode: String,
    pub servers: Vec<ServerCandidate>,
    pub dry_run: bool,
    pub staggered: bool,
    pub software: SoftwareId,
    pub main: BeaconTarget,
    pub objects: Vec<BeaconTarget>,
}

fn invalid(field: impl Into<String>) -> impl FnOnce(ModelError) -> ConfigError {
    let field = field.into();
    move |source| ConfigError::Invalid { field, source }
}

impl TryFrom<RawConfig> for BeaconConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let login = Callsign::try_from(raw.callsign.as_str()).map_err(invalid("callsign"))?;
        let beacon = match raw.beacon_callsign.as_deref().map(str::trim) {
            Some(cs) if !cs.is_empty() => {
                Some(Callsign::try_from(cs).map_err(invalid("beacon_callsign"))?)
            }
            _ => None,
        };

        if raw.passcode.is_empty() && !raw.dry_run {
            return Err(ConfigError::MissingPasscode);
        }
        if let Ok(configured) = raw.passcode.parse::<u16>() {
            let expected = passcode_for(login.as_str());
            if configured != expected {
                warn!(callsign = %login, "configured passcode does not match the callsign; the server may refuse to verify it");
            }
        }

        if raw.aprs_servers.is_empty() {
            return Err(ConfigError::NoServers);
        }

        let main = BeaconTarget::main_station(
            Position::new(raw.latitude, raw.longitude),
            Symbol::parse(&raw.symbol_table, &raw.symbol).map_err(invalid("symbol"))?,
            raw.comment,
            Interval::from_minutes(raw.interval).map_err(invalid("interval"))?,
        );

        let mut objects = Vec::with_capacity(raw.beacons.len());
        for (index, obj) in raw.beacons.into_iter().enumerate() {
            if obj.name.trim().is_empty() {
                warn!(index, "skipping object beacon without a name");
                continue;
            }
            let field = |name: &str| format!("beacons[{index}].{name}");
            let target = BeaconTarget::object(
                obj.name,
                Position::new(obj.latitude, obj.longitude),
                Symbol::parse(&obj.symbol_table, &obj.symbol).map_err(invalid(field("symbol")))?,
                obj.comment,
                Interval::from_minutes(obj.interval).map_err(invalid(field("interval")))?,
            )
            .map_err(invalid(field("name")))?;
            objects.push(target);
        }

        Ok(Self {
            identity: StationIdentity::new(login, beacon),
            passcode: raw.passcode,
            servers: raw.aprs_servers,
            dry_run: raw.dry_run,
            staggered: raw.staggered,
            software: raw.software.unwrap_or_default(),
            main,
            objects,
        })
    }
}

impl BeaconConfig {
    /// Every target, main station first.
    pub fn targets(&self) -> impl Iterator<Item = &BeaconTarget> {
        std::iter::once(&self.main).chain(self.objects.iter())
    }

    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials::new(self.identity.login.clone(), self.passcode.clone())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            dry_run: self.dry_run,
            software: self.software.clone(),
            ..SessionOptions::default()
        }
    }

    /// Emit the startup summary.
    pub fn log_summary(&self) {
        info!(
            login_callsign = %self.identity.login,
            beacon_callsign = %self.identity.beacon,
            latitude = self.main.position.latitude,
            longitude = self.main.position.longitude,
            interval = %self.main.interval,
            dry_run = self.dry_run,
            staggered = self.staggered,
            objects = self.objects.len(),
            servers = self.servers.len(),
            "beacon configuration"
        );
    }
}
