//! Cache Entry Module
//!
//! Defines a cached response body and its expiry instant.

use axum::body::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

/// Format used for the expiry header, e.g. `2024-01-01 12:10:00 UTC`.
pub const EXPIRE_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// == Cache Entry ==
/// A cached response body.
///
/// Only the body is kept; status and headers of the original response are
/// not part of the cached payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Response body
    pub content: Bytes,
    /// Instant at which the entry stops being served
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that lives for `minutes` starting at `now`.
    pub fn new(content: impl Into<Bytes>, now: DateTime<Utc>, minutes: u64) -> Self {
        let ttl = i64::try_from(minutes)
            .ok()
            .and_then(TimeDelta::try_minutes)
            .unwrap_or(TimeDelta::MAX);

        Self {
            content: content.into(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Expiry rendered for the diagnostic header.
    pub fn expire_at_display(&self) -> String {
        self.expires_at.format(EXPIRE_AT_FORMAT).to_string()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("body", noon(), 10);

        assert_eq!(entry.content, Bytes::from("body"));
        assert_eq!(entry.expires_at, noon() + TimeDelta::minutes(10));
    }

    #[test]
    fn test_entry_not_expired_before_deadline() {
        let entry = CacheEntry::new("body", noon(), 10);
        assert!(!entry.is_expired_at(noon() + TimeDelta::minutes(9)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new("body", noon(), 10);

        // Expired exactly at the deadline
        assert!(entry.is_expired_at(noon() + TimeDelta::minutes(10)));
        assert!(entry.is_expired_at(noon() + TimeDelta::minutes(11)));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("body", noon(), u64::MAX);
        assert!(!entry.is_expired_at(noon() + TimeDelta::days(365 * 100)));
    }

    #[test]
    fn test_expire_at_display() {
        let entry = CacheEntry::new("body", noon(), 10);
        assert_eq!(entry.expire_at_display(), "2024-01-01 12:10:00 UTC");
    }
}
