//! Host abstraction for the Warden login layer.
//!
//! Warden is a library consumed by request-handling code, not a server. The
//! seams to the host live here:
//! - [`ServerSession`] — per-request view of the host's session store
//! - [`WebRequest`] / [`WebResponse`] — the slice of the host's request and
//!   response types the login layer needs
//! - [`memory`] — in-memory implementations for tests and embedded hosts

pub mod memory;
mod request;
mod session;

pub use memory::{MemoryRequest, MemoryResponse, MemorySession};
pub use request::{WebRequest, WebResponse};
pub use session::ServerSession;
