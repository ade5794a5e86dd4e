//! Hash functions for Enki
//!
//! Rule identifiers are derived from a 32-bit FNV-1a hash of the pattern text,
//! so the same pattern always maps to the same dynamic rule id and a rule can
//! be replaced idempotently.
//!
//! # Reserved Range
//!
//! Generated ids live in `RULE_ID_BASE..=RULE_ID_MAX`. Ids below the base are
//! left for static rules shipped with the extension.

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Lowest id handed out to a pattern rule.
pub const RULE_ID_BASE: i32 = 100_000;

/// Largest id the host accepts (signed 31-bit max).
pub const RULE_ID_MAX: i32 = 0x7fff_ffff;

/// Standard FNV-1a over raw bytes.
#[inline]
pub fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Stable rule id for a wildcard pattern.
#[inline]
pub fn rule_id_for_pattern(pattern: &str) -> i32 {
    rule_id_from_hash(fnv1a_32(pattern.as_bytes()))
}

/// Map a raw 32-bit hash into the reserved id range.
///
/// The hash is masked to 31 bits, a zero is promoted to 1, and the base is
/// added. A sum past `RULE_ID_MAX` wraps back into the reserved range rather
/// than below the base.
#[inline]
pub fn rule_id_from_hash(hash: u32) -> i32 {
    let masked = match hash & 0x7fff_ffff {
        0 => 1,
        h => h as u64,
    };

    let base = RULE_ID_BASE as u64;
    let max = RULE_ID_MAX as u64;
    let id = masked + base;
    if id <= max {
        return id as i32;
    }

    let span = max - base + 1;
    (base + masked % span) as i32
}
