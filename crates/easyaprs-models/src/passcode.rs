//! APRS-IS passcode derivation.
//!
//! The passcode is a 15-bit hash of the base callsign. It is not a secret
//! in any cryptographic sense; servers use it to decide whether a login may
//! inject packets.

/// Compute the APRS-IS passcode for a callsign.
///
/// The SSID suffix is ignored and the callsign is uppercased first.
///
/// # Examples
///
/// ```
/// use easyaprs_models::passcode_for;
///
/// assert_eq!(passcode_for("N0CALL"), 13023);
/// assert_eq!(passcode_for("n0call-9"), 13023);
/// ```
pub fn passcode_for(callsign: &str) -> u16 {
    let base = callsign
        .trim()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();

    let mut hash: u16 = 0x73e2;
    for pair in base.as_bytes().chunks(2) {
        hash ^= u16::from(pair[0]) << 8;
        if let Some(&low) = pair.get(1) {
            hash ^= u16::from(low);
        }
    }
    hash & 0x7fff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_passcodes() {
        assert_eq!(passcode_for("N0CALL"), 13023);
        assert_eq!(passcode_for("9M2PJU"), 12970);
    }

    #[test]
    fn ssid_and_case_are_ignored() {
        assert_eq!(passcode_for("9m2pju-10"), passcode_for("9M2PJU"));
    }

    #[test]
    fn odd_length_callsign() {
        assert_eq!(passcode_for("K1ABC"), 14993);
        assert_eq!(passcode_for("K1AB"), 31121);
    }
}
