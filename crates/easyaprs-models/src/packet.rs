//! APRS packet encoders.
//!
//! Both encoders are pure string builders: identical input always yields
//! byte-identical output. The `\r\n` line terminator is added by the session
//! layer, not here.
//!
//! The comment follows the symbol code verbatim. No separator is inserted, so
//! a comment meant to start with `/` must carry it.

use crate::coord::Position;
use crate::station::Callsign;
use crate::symbol::Symbol;

/// Destination and path used for every packet injected over APRS-IS.
pub const TCPIP_PATH: &str = "APRS,TCPIP*";

/// Fixed timestamp field written into object reports.
///
/// This is a placeholder, not the current time. Receivers therefore see a
/// constant DHM timestamp; it is kept as-is for wire compatibility.
pub const OBJECT_TIMESTAMP: &str = "111111z";

/// Object names are always exactly this many characters on the wire.
pub const OBJECT_NAME_WIDTH: usize = 9;

/// Build a position report without timestamp (`=` data type).
///
/// # Examples
///
/// ```
/// use easyaprs_models::{position_report, Callsign, Position, Symbol};
///
/// let source: Callsign = "9M2PJU".parse().unwrap();
/// let packet = position_report(
///     &source,
///     Position::new(3.1390, 101.6869),
///     Symbol::new('/', 'r'),
///     "/test",
/// );
/// assert_eq!(packet, "9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Er/test");
/// ```
pub fn position_report(
    source: &Callsign,
    position: Position,
    symbol: Symbol,
    comment: &str,
) -> String {
    format!(
        "{source}>{TCPIP_PATH}:={}{}{}{}{comment}",
        position.latitude_str(),
        symbol.table,
        position.longitude_str(),
        symbol.code,
    )
}

/// Build a live object report (`;` data type) for a named object.
///
/// The name is space-padded or truncated to [`OBJECT_NAME_WIDTH`] characters.
pub fn object_report(
    source: &Callsign,
    name: &str,
    position: Position,
    symbol: Symbol,
    comment: &str,
) -> String {
    format!(
        "{source}>{TCPIP_PATH}:;{}*{OBJECT_TIMESTAMP}{}{}{}{}{comment}",
        pad_object_name(name),
        position.latitude_str(),
        symbol.table,
        position.longitude_str(),
        symbol.code,
    )
}

/// Left-align `name` in a field of exactly [`OBJECT_NAME_WIDTH`] characters.
pub fn pad_object_name(name: &str) -> String {
    name.chars()
        .chain(std::iter::repeat(' '))
        .take(OBJECT_NAME_WIDTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Callsign {
        "9M2PJU".parse().unwrap()
    }

    fn kl() -> Position {
        Position::new(3.1390, 101.6869)
    }

    #[test]
    fn position_golden_string() {
        let packet = position_report(&source(), kl(), Symbol::new('/', 'r'), "/test");
        assert_eq!(packet, "9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Er/test");
    }

    #[test]
    fn comment_is_appended_verbatim() {
        let packet = position_report(&source(), kl(), Symbol::new('/', 'r'), "test");
        assert_eq!(packet, "9M2PJU>APRS,TCPIP*:=0308.34N/10141.21Ertest");
    }

    #[test]
    fn position_empty_comment() {
        let packet = position_report(&source(), kl(), Symbol::new('\\', '-'), "");
        assert_eq!(packet, "9M2PJU>APRS,TCPIP*:=0308.34N\\10141.21E-");
    }

    #[test]
    fn object_golden_string() {
        let packet = object_report(&source(), "SHELTER", kl(), Symbol::new('/', 'h'), "/open");
        assert_eq!(
            packet,
            "9M2PJU>APRS,TCPIP*:;SHELTER  *111111z0308.34N/10141.21Eh/open"
        );
    }

    #[test]
    fn object_name_is_always_nine_characters() {
        for name in ["", "A", "NINECHARS", "FIFTEEN-CHARSXX"] {
            let padded = pad_object_name(name);
            assert_eq!(padded.chars().count(), OBJECT_NAME_WIDTH, "name {name:?}");

            let packet = object_report(&source(), name, kl(), Symbol::default(), "");
            let field = packet
                .split_once(":;")
                .map(|(_, payload)| &payload[..OBJECT_NAME_WIDTH])
                .unwrap();
            assert_eq!(field, padded);
            assert_eq!(&packet.split_once(":;").unwrap().1[9..17], "*111111z");
        }
        assert_eq!(pad_object_name(""), "         ");
        assert_eq!(pad_object_name("A"), "A        ");
        assert_eq!(pad_object_name("NINECHARS"), "NINECHARS");
        assert_eq!(pad_object_name("FIFTEEN-CHARSXX"), "FIFTEEN-C");
    }

    #[test]
    fn encoders_are_deterministic() {
        let a = object_report(&source(), "X", kl(), Symbol::default(), "c");
        let b = object_report(&source(), "X", kl(), Symbol::default(), "c");
        assert_eq!(a, b);
    }
}
