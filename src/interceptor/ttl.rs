//! TTL Resolution
//!
//! Turns an optional per-route lifetime into the effective number of minutes.

use crate::config::DEFAULT_CACHE_MINUTES;

// == TTL Resolver ==
/// Applies the minimum cache lifetime.
///
/// An explicit value can raise the lifetime above the default but never
/// lower it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlResolver {
    default_minutes: u64,
}

impl TtlResolver {
    /// A resolver with `default_minutes` as the floor (at least one minute).
    pub fn new(default_minutes: u64) -> Self {
        Self {
            default_minutes: default_minutes.max(1),
        }
    }

    pub fn default_minutes(&self) -> u64 {
        self.default_minutes
    }

    // == Resolve Minutes ==
    pub fn resolve_minutes(&self, explicit: Option<i64>) -> u64 {
        match explicit {
            None => self.default_minutes,
            Some(minutes) => u64::try_from(minutes)
                .map_or(self.default_minutes, |m| m.max(self.default_minutes)),
        }
    }

    /// Same as [`resolve_minutes`](Self::resolve_minutes) for a raw textual value.
    pub fn resolve_raw(&self, raw: Option<&str>) -> u64 {
        self.resolve_minutes(raw.map(parse_minutes))
    }
}

impl Default for TtlResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_MINUTES)
    }
}

// == Parse Minutes ==
/// Reads the leading integer of `raw`, truncating any fraction.
///
/// `"15"` → 15, `"15.9"` → 15, `" -3"` → -3, `"abc"` → 0. Out-of-range
/// values saturate.
pub fn parse_minutes(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}
