//! MAC address normalization.

/// Normalize a MAC address to the uppercase colon-separated form the
/// controller expects (`AA:BB:CC:DD:EE:FF`).
///
/// Accepts colon, hyphen, or dot separated input as well as a bare
/// 12-digit hex string. Returns `None` when the input does not reduce to
/// exactly twelve hex digits.
pub fn normalize_mac(input: &str) -> Option<String> {
    let digits: Vec<char> = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if digits.len() != 12 || !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }

    let mut out = String::with_capacity(17);
    for (i, pair) in digits.chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.extend(pair);
    }
    Some(out)
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::normalize_mac;

    #[test]
    fn accepts_common_separator_styles() {
        for input in [
            "aa:bb:cc:dd:ee:ff",
            "AA-BB-CC-DD-EE-FF",
            "aabb.ccdd.eeff",
            "aabbccddeeff",
            "  aa:bb:cc:dd:ee:ff  ",
        ] {
            assert_eq!(
                normalize_mac(input).as_deref(),
                Some("AA:BB:CC:DD:EE:FF"),
                "input: {input}"
            );
        }
    }

    #[test]
    fn preserves_digit_values() {
        assert_eq!(
            normalize_mac("01-23-45-67-89-ab").as_deref(),
            Some("01:23:45:67:89:AB")
        );
    }

    #[test]
    fn rejects_wrong_lengths_and_garbage() {
        for input in [
            "",
            "aa:bb:cc:dd:ee",
            "aa:bb:cc:dd:ee:ff:00",
            "aabbccddeefg",
            "hello world!",
            "aa bb cc dd ee ff",
        ] {
            assert_eq!(normalize_mac(input), None, "input: {input}");
        }
    }
}
