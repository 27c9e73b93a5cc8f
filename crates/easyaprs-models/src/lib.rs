#![deny(missing_docs)]

//! # EasyAPRS Models
//!
//! Core data types and pure encoders for a transmit-only APRS-IS beacon.
//!
//! ## Packet anatomy
//!
//! ```text
//! 9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Er/comment        position report
//! 9M2PJU>APRS,TCPIP*:;SHELTER  *111111z0308.34N/...     object report
//! └─source┘└─path────┘└─payload (coord + symbol + comment)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`coord`] | Decimal degrees → APRS `DDMM.mmX` / `DDDMM.mmX` |
//! | [`packet`] | Position and object report encoders |
//! | [`station`] | Callsigns and the login/beacon identity pair |
//! | [`symbol`] | APRS symbol table + symbol code |
//! | [`beacon`] | Beacon targets (main station or named object) and intervals |
//! | [`server`] | APRS-IS server candidates |
//! | [`passcode`] | APRS-IS passcode derivation |

pub mod beacon;
pub mod coord;
pub mod error;
pub mod packet;
pub mod passcode;
pub mod server;
pub mod station;
pub mod symbol;

// Re-export all public types at crate root for convenience.
pub use beacon::*;
pub use coord::*;
pub use error::*;
pub use packet::*;
pub use passcode::*;
pub use server::*;
pub use station::*;
pub use symbol::*;
