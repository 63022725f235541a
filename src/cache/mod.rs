//! Cache Module
//!
//! Storage for cached response bodies: the store boundary, an in-memory
//! implementation, and the clock both sides agree on.

mod clock;
mod entry;
mod lru;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EXPIRE_AT_FORMAT};
pub use lru::LruTracker;
pub use memory::MemoryStore;
pub use stats::CacheStats;
pub use store::{Lookup, ResponseStore};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Largest response body the in-memory store keeps
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
