//! Address normalization.
//!
//! Turns the textual forms of an IP address into one canonical `AddressKey`:
//! IPv4 dotted quads are offset into the IPv4-mapped IPv6 range, IPv6 text
//! (with `::` compression and an optional embedded IPv4 tail) maps to its
//! 128-bit value.

use std::net::Ipv6Addr;

use super::types::AddressKey;
use crate::config::IPV4_MAPPED_BASE;
use crate::error_handling::AddressError;

/// Normalizes an IPv4 or IPv6 address into its canonical key.
///
/// `8.8.8.8` and `::ffff:8.8.8.8` produce the same key. Surrounding
/// whitespace, zone identifiers and brackets are not accepted.
///
/// # Errors
///
/// Returns `AddressError::InvalidAddressFormat` naming the malformed part.
///
/// # Examples
///
/// ```
/// use geoip_ranges::normalize;
///
/// assert_eq!(normalize("0.0.0.0").unwrap().value(), 281_470_681_743_360);
/// assert_eq!(normalize("::1").unwrap().value(), 1);
/// assert_eq!(normalize("8.8.8.8").unwrap(), normalize("::ffff:8.8.8.8").unwrap());
/// ```
pub fn normalize(address: &str) -> Result<AddressKey, AddressError> {
    if is_ipv4(address) {
        let value = parse_ipv4(address)?;
        // IPV4_MAPPED_BASE + u32::MAX < 2^49
        Ok(AddressKey::new(IPV4_MAPPED_BASE + u128::from(value)))
    } else {
        parse_ipv6(address).map(AddressKey::new)
    }
}

/// Dotted quad with no colon; anything else takes the IPv6 path.
fn is_ipv4(address: &str) -> bool {
    !address.contains(':') && address.split('.').count() == 4
}

/// Parses a bare dotted quad into its 32-bit value (no mapped offset).
///
/// Unlike `Ipv4Addr`, octets may carry leading zeros (`010` is ten).
fn parse_ipv4(address: &str) -> Result<u32, AddressError> {
    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 {
        return Err(AddressError::invalid(
            address,
            format!("expected 4 dotted octets, found {}", octets.len()),
        ));
    }

    let mut value = 0u32;
    for octet in octets {
        value = (value << 8) | u32::from(parse_octet(octet, address)?);
    }
    Ok(value)
}

fn parse_octet(octet: &str, address: &str) -> Result<u8, AddressError> {
    if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AddressError::invalid(
            address,
            format!("IPv4 octet \"{octet}\" is not a decimal number"),
        ));
    }
    octet.parse::<u8>().map_err(|_| {
        AddressError::invalid(address, format!("IPv4 octet \"{octet}\" is out of range 0-255"))
    })
}

/// Full IPv6 grammar, including `::` and an embedded IPv4 tail.
///
/// The tail follows `Ipv6Addr` rules, so its octets take no leading zeros.
fn parse_ipv6(address: &str) -> Result<u128, AddressError> {
    address
        .parse::<Ipv6Addr>()
        .map(u128::from)
        .map_err(|e| AddressError::invalid(address, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn key(address: &str) -> u128 {
        normalize(address)
            .unwrap_or_else(|e| panic!("{address} should normalize: {e}"))
            .value()
    }

    fn assert_invalid(address: &str) {
        match normalize(address) {
            Err(AddressError::InvalidAddressFormat { address: a, .. }) => assert_eq!(a, address),
            Ok(k) => panic!("{address:?} should be rejected, got key {k}"),
        }
    }

    #[test]
    fn test_ipv4_bounds() {
        assert_eq!(key("0.0.0.0"), 281_470_681_743_360);
        assert_eq!(key("255.255.255.255"), 281_470_681_743_360 + 4_294_967_295);
    }

    #[test]
    fn test_ipv4_octet_weights() {
        assert_eq!(key("1.0.0.0") - IPV4_MAPPED_BASE, 16_777_216);
        assert_eq!(key("0.1.0.0") - IPV4_MAPPED_BASE, 65_536);
        assert_eq!(key("0.0.1.0") - IPV4_MAPPED_BASE, 256);
        assert_eq!(key("0.0.0.1") - IPV4_MAPPED_BASE, 1);
        assert_eq!(key("8.8.8.8"), 281_470_816_487_432);
    }

    #[test]
    fn test_ipv4_and_mapped_ipv6_agree() {
        assert_eq!(key("8.8.8.8"), key("::ffff:8.8.8.8"));
        assert_eq!(key("8.8.8.8"), key("::ffff:808:808"));
        assert_eq!(key("8.8.8.8"), key("0:0:0:0:0:ffff:8.8.8.8"));
        assert_eq!(key("192.168.1.1"), key("::FFFF:192.168.1.1"));
    }

    #[test]
    fn test_ipv6_compression() {
        assert_eq!(key("::"), 0);
        assert_eq!(key("::1"), 1);
        assert_eq!(key("1::"), 1 << 112);
        assert_eq!(key("2001:db8::1"), 0x2001_0db8_0000_0000_0000_0000_0000_0001);
        assert_eq!(key("2001:db8::"), 0x2001_0db8_0000_0000_0000_0000_0000_0000);
        assert_eq!(key("2001:db8:0:0:1::"), 0x2001_0db8_0000_0000_0001_0000_0000_0000);
        assert_eq!(
            key("2001:0db8:0000:0000:0000:0000:0000:0001"),
            key("2001:db8::1")
        );
        // "::" standing for a single group
        assert_eq!(key("1:2:3:4:5:6::8"), 0x0001_0002_0003_0004_0005_0006_0000_0008);
    }

    #[test]
    fn test_ipv6_extremes() {
        assert_eq!(key("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"), u128::MAX);
        assert_eq!(key("0:0:0:0:0:0:0:0"), 0);
    }

    #[test]
    fn test_embedded_ipv4_tail() {
        assert_eq!(key("::8.8.8.8"), 0x0808_0808);
        assert_eq!(key("1:2:3:4:5:6:1.2.3.4"), 0x0001_0002_0003_0004_0005_0006_0102_0304);
        assert_eq!(key("64:ff9b::192.0.2.33"), 0x0064_ff9b_0000_0000_0000_0000_c000_0221);
    }

    #[test]
    fn test_rejects_malformed_ipv4() {
        for address in [
            "999.1.1.1",
            "256.0.0.0",
            "1.2.3",
            "1.2.3.4.5",
            "1..2.3",
            "1.2.3.",
            "a.b.c.d",
            "-1.2.3.4",
            "+1.2.3.4",
            "1.2.3.0x4",
            "0001.2.3.4",
            " 8.8.8.8",
            "8.8.8.8\n",
            "8.8.8.8\0",
        ] {
            assert_invalid(address);
        }
    }

    #[test]
    fn test_rejects_malformed_ipv6() {
        for address in [
            "",
            "not-an-ip",
            "gggg::1",
            "1:2:3:4:5:6:7",
            "1:2:3:4:5:6:7:8:9",
            "1::2::3",
            ":::",
            "1:::2",
            "12345::1",
            "+1::",
            "1:2:3:4:5:6:7:8::",
            "::ffff:999.1.1.1",
            "::ffff:1.2.3",
            "1:2:3:4:5:6:7:1.2.3.4",
            ":1.2.3.4",
            "fe80::1%eth0",
            "[::1]",
        ] {
            assert_invalid(address);
        }
    }

    #[test]
    fn test_very_long_input_is_rejected() {
        assert_invalid(&"A".repeat(10_000));
        assert_invalid(&"1:".repeat(5_000));
    }

    #[test]
    fn test_leading_zero_octets_accepted() {
        assert_eq!(key("010.0.0.1"), key("10.0.0.1"));
        // only in a bare dotted quad
        assert_invalid("::ffff:010.0.0.1");
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_ipv4_matches_std(value in any::<u32>()) {
            let text = Ipv4Addr::from(value).to_string();
            prop_assert_eq!(key(&text), IPV4_MAPPED_BASE + u128::from(value));
        }

        #[test]
        fn test_ipv6_matches_std(value in any::<u128>()) {
            let text = Ipv6Addr::from(value).to_string();
            prop_assert_eq!(key(&text), value);
        }

        #[test]
        fn test_mapped_form_matches_dotted_quad(value in any::<u32>()) {
            let v4 = Ipv4Addr::from(value);
            prop_assert_eq!(key(&v4.to_string()), key(&format!("::ffff:{v4}")));
        }

        #[test]
        fn test_arbitrary_text_never_panics(text in "[0-9a-fA-F:.]{0,45}") {
            let _ = normalize(&text);
        }
    }
}
