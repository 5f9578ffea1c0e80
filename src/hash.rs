/// Polynomial rolling hash over UTF-16 code units.
///
/// `h = h * 31 + unit (mod 2^32)`, starting at 0. Pure integer arithmetic, so
/// the result is identical on every platform and never depends on locale.
pub fn rolling_hash(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Reduce the hash of `input` to an index into a table of `len` entries.
pub fn bucket(input: &str, len: usize) -> usize {
    debug_assert!(len > 0, "bucket table must not be empty");
    rolling_hash(input) as usize % len
}
