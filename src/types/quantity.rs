//! Kubernetes-style quantity parsing.
//!
//! Parses `Ki/Mi/Gi/Ti` (power-of-two) and `K/M/G/T` (power-of-ten) suffixed
//! strings into a byte count, and provides the checked int32 conversions the
//! conversion engine needs when re-typing `memoryMiB`/disk-GiB alpha ints
//! against the beta `Quantity` string.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    #[error("malformed quantity string: {0:?}")]
    Malformed(String),
    #[error("value {0} does not fit in a signed 32-bit integer")]
    Overflow(i64),
}

const KI: i64 = 1024;
const MI: i64 = KI * 1024;
const GI: i64 = MI * 1024;
const TI: i64 = GI * 1024;
const K: i64 = 1000;
const M: i64 = K * 1000;
const G: i64 = M * 1000;
const T: i64 = G * 1000;

/// Parses a quantity string like `"4Gi"` or `"512Mi"` into a byte count.
/// Malformed strings (non-numeric magnitude, unknown suffix) fail the call.
pub fn parse_bytes(input: &str) -> Result<i64, QuantityError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(QuantityError::Malformed(input.to_string()));
    }

    let (magnitude_str, multiplier) = if let Some(m) = trimmed.strip_suffix("Ki") {
        (m, KI)
    } else if let Some(m) = trimmed.strip_suffix("Mi") {
        (m, MI)
    } else if let Some(m) = trimmed.strip_suffix("Gi") {
        (m, GI)
    } else if let Some(m) = trimmed.strip_suffix("Ti") {
        (m, TI)
    } else if let Some(m) = trimmed.strip_suffix('K') {
        (m, K)
    } else if let Some(m) = trimmed.strip_suffix('M') {
        (m, M)
    } else if let Some(m) = trimmed.strip_suffix('G') {
        (m, G)
    } else if let Some(m) = trimmed.strip_suffix('T') {
        (m, T)
    } else {
        (trimmed, 1)
    };

    let magnitude: f64 = magnitude_str
        .trim()
        .parse()
        .map_err(|_| QuantityError::Malformed(input.to_string()))?;
    if !magnitude.is_finite() || magnitude < 0.0 {
        return Err(QuantityError::Malformed(input.to_string()));
    }

    Ok((magnitude * multiplier as f64).round() as i64)
}

pub fn format_mib(mib: i64) -> String {
    format!("{}Mi", mib)
}

pub fn format_gib(gib: i64) -> String {
    format!("{}Gi", gib)
}

pub fn mib_to_bytes(mib: i64) -> i64 {
    mib * MI
}

pub fn gib_to_bytes(gib: i64) -> i64 {
    gib * GI
}

/// Converts a byte count to whole MiB, failing if the result overflows
/// `i32` — the alpha schema's `memoryMiB` field width.
pub fn bytes_to_mib_i32(bytes: i64) -> Result<i32, QuantityError> {
    let mib = bytes / MI;
    i32::try_from(mib).map_err(|_| QuantityError::Overflow(mib))
}

/// Same as [`bytes_to_mib_i32`] but for whole GiB, used for disk sizes.
pub fn bytes_to_gib_i32(bytes: i64) -> Result<i32, QuantityError> {
    let gib = bytes / GI;
    i32::try_from(gib).map_err(|_| QuantityError::Overflow(gib))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_binary_suffixes() {
        assert_eq!(parse_bytes("4Gi").unwrap(), 4 * GI);
        assert_eq!(parse_bytes("512Mi").unwrap(), 512 * MI);
        assert_eq!(parse_bytes("1Ti").unwrap(), TI);
        assert_eq!(parse_bytes("2Ki").unwrap(), 2 * KI);
    }

    #[test]
    fn parses_decimal_suffixes_and_bare_numbers() {
        assert_eq!(parse_bytes("3G").unwrap(), 3 * G);
        assert_eq!(parse_bytes("1024").unwrap(), 1024);
    }

    #[test]
    fn malformed_strings_fail() {
        assert!(parse_bytes("").is_err());
        assert!(parse_bytes("four gigs").is_err());
        assert!(parse_bytes("Gi").is_err());
        assert!(parse_bytes("-1Gi").is_err());
    }

    #[test]
    fn memory_range_overflow_is_detected() {
        // 4Ti / 1Mi > i32::MAX.
        let bytes = parse_bytes("4Ti").unwrap();
        assert!(bytes_to_mib_i32(bytes).is_err());
    }

    #[test]
    fn in_range_conversion_round_trips() {
        let bytes = mib_to_bytes(4096);
        assert_eq!(bytes_to_mib_i32(bytes).unwrap(), 4096);
    }
}
