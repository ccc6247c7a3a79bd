//! ISIN format and checksum validation (ISO 6166).

use regex::Regex;

/// Check the 12-character ISIN shape: two uppercase letters, nine
/// alphanumerics, one check digit.
pub fn is_isin_format(token: &str) -> bool {
    let bytes = token.as_bytes();
    if bytes.len() != 12 {
        return false;
    }
    bytes[..2].iter().all(|b| b.is_ascii_uppercase())
        && bytes[2..11]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && bytes[11].is_ascii_digit()
}

/// Validate an ISIN's check digit.
///
/// Letters map to numbers (A=10 .. Z=35) producing a digit string; the
/// Luhn sum over it, doubling every second digit from the right, must be
/// divisible by 10.
pub fn validate_isin(token: &str) -> bool {
    if !is_isin_format(token) {
        return false;
    }

    let mut digits: Vec<u32> = Vec::with_capacity(24);
    for ch in token.chars() {
        match ch.to_digit(36) {
            Some(v) if v >= 10 => {
                digits.push(v / 10);
                digits.push(v % 10);
            }
            Some(v) => digits.push(v),
            None => return false,
        }
    }

    let mut sum = 0u32;
    for (i, &d) in digits.iter().rev().enumerate() {
        let mut d = d;
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

/// Find every ISIN-shaped substring in `text`, with its byte offset.
///
/// Matches are boundary-checked so longer alphanumeric runs do not yield
/// spurious identifiers. Validity is not checked here; the assembler
/// keeps invalid identifiers for audit.
pub fn find_isins(text: &str) -> Vec<(usize, String)> {
    let re = isin_pattern();
    re.find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !before.map(|c| c.is_ascii_alphanumeric()).unwrap_or(false)
                && !after.map(|c| c.is_ascii_alphanumeric()).unwrap_or(false)
        })
        .map(|m| (m.start(), m.as_str().to_string()))
        .collect()
}

/// The ISIN shape as a regex, for embedding in larger scans.
pub fn isin_pattern() -> Regex {
    Regex::new(r"[A-Z]{2}[A-Z0-9]{9}[0-9]").unwrap()
}
