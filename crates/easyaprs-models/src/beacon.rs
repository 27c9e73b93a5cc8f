//! Beacon targets.
//!
//! A [`BeaconTarget`] is one independently scheduled transmission: either
//! the main station's own position or a named object. Targets are built once
//! from configuration and never change for the lifetime of a run.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coord::Position;
use crate::error::ModelError;
use crate::packet::{object_report, position_report};
use crate::station::Callsign;
use crate::symbol::Symbol;

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// A beacon interval in whole minutes, between [`Interval::MIN`] and
/// [`Interval::MAX`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct Interval(u32);

impl Interval {
    /// Shortest accepted interval (one minute).
    pub const MIN: u32 = 1;
    /// Longest accepted interval (one day).
    pub const MAX: u32 = 1440;

    /// Validate an interval given in minutes.
    pub fn from_minutes(minutes: u32) -> Result<Self, ModelError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(ModelError::InvalidInterval {
                value: minutes,
                reason: format!("must be between {} and {}", Self::MIN, Self::MAX),
            })
        }
    }

    /// The interval in minutes.
    pub fn minutes(self) -> u32 {
        self.0
    }

    /// The interval as a [`Duration`].
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.0) * 60)
    }
}

impl Default for Interval {
    /// Ten minutes.
    fn default() -> Self {
        Self(10)
    }
}

impl TryFrom<u32> for Interval {
    type Error = ModelError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::from_minutes(minutes)
    }
}

impl From<Interval> for u32 {
    fn from(i: Interval) -> Self {
        i.0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

// ---------------------------------------------------------------------------
// BeaconKind / BeaconTarget
// ---------------------------------------------------------------------------

/// What a target transmits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum BeaconKind {
    /// The station's own position report. Exactly one per run.
    MainStation,
    /// A named object report.
    Object {
        /// Object name; padded or truncated to nine characters on the wire.
        name: String,
    },
}

/// One periodically transmitted report.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BeaconTarget {
    /// Main station or named object.
    pub kind: BeaconKind,
    /// Reported position.
    pub position: Position,
    /// Map symbol.
    pub symbol: Symbol,
    /// Free-text comment appended after the symbol.
    pub comment: String,
    /// Time between transmissions.
    pub interval: Interval,
}

impl BeaconTarget {
    /// The main-station target.
    pub fn main_station(
        position: Position,
        symbol: Symbol,
        comment: impl Into<String>,
        interval: Interval,
    ) -> Self {
        Self {
            kind: BeaconKind::MainStation,
            position,
            symbol,
            comment: comment.into(),
            interval,
        }
    }

    /// A named object target. The name must not be blank.
    pub fn object(
        name: impl Into<String>,
        position: Position,
        symbol: Symbol,
        comment: impl Into<String>,
        interval: Interval,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::InvalidObjectName {
                value: name,
                reason: "must not be empty".to_string(),
            });
        }
        Ok(Self {
            kind: BeaconKind::Object { name },
            position,
            symbol,
            comment: comment.into(),
            interval,
        })
    }

    /// Short label used in logs: `"main"` or the object name.
    pub fn label(&self) -> &str {
        match &self.kind {
            BeaconKind::MainStation => "main",
            BeaconKind::Object { name } => name,
        }
    }

    /// Encode this target as an APRS packet sourced from `source`.
    pub fn render(&self, source: &Callsign) -> String {
        match &self.kind {
            BeaconKind::MainStation => {
                position_report(source, self.position, self.symbol, &self.comment)
            }
            BeaconKind::Object { name } => {
                object_report(source, name, self.position, self.symbol, &self.comment)
            }
        }
    }
}

impl fmt::Display for BeaconTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} every {}", self.label(), self.interval)
    }
}
