//! Coordinate formatting.
//!
//! APRS encodes positions as fixed-width degrees + decimal minutes:
//! `DDMM.mmN` for latitude and `DDDMM.mmE` for longitude. Input ranges are
//! not validated; callers provide sane values.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// Which axis a coordinate belongs to; selects width and hemisphere letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    /// North/south, two degree digits.
    Latitude,
    /// East/west, three degree digits.
    Longitude,
}

impl Axis {
    fn hemisphere(self, value: f64) -> char {
        let non_negative = value >= 0.0;
        match (self, non_negative) {
            (Axis::Latitude, true) => 'N',
            (Axis::Latitude, false) => 'S',
            (Axis::Longitude, true) => 'E',
            (Axis::Longitude, false) => 'W',
        }
    }
}

/// Format a signed decimal-degree value as an APRS coordinate string.
///
/// Minutes are rounded to two decimals. A value that would round up to
/// `60.00` minutes carries into the degrees instead, so minutes always stay
/// below 60.
///
/// # Examples
///
/// ```
/// use easyaprs_models::{format_coordinate, Axis};
///
/// assert_eq!(format_coordinate(3.1390, Axis::Latitude), "0308.34N");
/// assert_eq!(format_coordinate(101.6869, Axis::Longitude), "10141.21E");
/// ```
pub fn format_coordinate(value: f64, axis: Axis) -> String {
    let magnitude = value.abs();
    let whole = magnitude.trunc();
    let mut degrees = whole as u32;
    let mut minutes = format!("{:05.2}", (magnitude - whole) * 60.0);
    if minutes == "60.00" {
        degrees += 1;
        minutes = "00.00".to_string();
    }

    let hemisphere = axis.hemisphere(value);
    match axis {
        Axis::Latitude => format!("{degrees:02}{minutes}{hemisphere}"),
        Axis::Longitude => format!("{degrees:03}{minutes}{hemisphere}"),
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in signed decimal degrees (north and east positive).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// APRS-formatted latitude, e.g. `0308.34N`.
    pub fn latitude_str(&self) -> String {
        format_coordinate(self.latitude, Axis::Latitude)
    }

    /// APRS-formatted longitude, e.g. `10141.21E`.
    pub fn longitude_str(&self) -> String {
        format_coordinate(self.longitude, Axis::Longitude)
    }
}
