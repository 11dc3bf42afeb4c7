//! Process-local cache of verified login sessions.
//!
//! This crate provides the in-memory layer that lets a web application skip
//! re-validating an authenticated session on every request:
//! - O(1) lookup keyed by the host's session identifier
//! - a `verified_at` timestamp per entry, refreshed on each successful check
//! - synchronous, lock-guarded operations that never block on I/O
//!
//! The cache is value-generic; the login layer stores `Arc`-shared session
//! entities in it.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_session::SessionCache;
//!
//! let cache = SessionCache::new();
//! cache.insert("sid-1", session);
//! let hit = cache.lookup("sid-1");
//! ```

mod cache;
mod clock;

pub use cache::{CacheEntry, SessionCache};
pub use clock::{Clock, ManualClock, SystemClock};
