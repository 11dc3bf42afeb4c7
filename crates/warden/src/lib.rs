//! Warden: server-side session cache and verification layer for OAuth 2.0
//! authorization-code logins.
//!
//! A request arrives; the [`LoginManager`] checks the process-local
//! [`SessionCache`] by the request's server-session identifier. A hit is
//! confirmed with a cheap key comparison; a miss falls back to the durable
//! session store through the [`AuthSettings`] collaborator, and the result
//! is cached so later requests skip the store entirely. Fresh logins are
//! driven through the provider redirect/callback dance by
//! [`LoginManager::login`].
//!
//! Hosts integrate by implementing the [`WebRequest`]/[`WebResponse`]/
//! [`ServerSession`] traits over their framework of choice; in-memory
//! implementations back the test suites.

pub use warden_oauth::{
    AuthSettings, LoginManager, OAuthError, OAuthSession, OAuthSettings, PkceChallenge,
    PreconditionMode, ProviderEndpoints, RequestAuth, Result, TokenSet,
};
pub use warden_session::{CacheEntry, Clock, ManualClock, SessionCache, SystemClock};
pub use warden_web::{
    MemoryRequest, MemoryResponse, MemorySession, ServerSession, WebRequest, WebResponse,
};
