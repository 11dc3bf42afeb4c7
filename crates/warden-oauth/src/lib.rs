//! OAuth 2.0 authorization-code login flow and session verification.
//!
//! Tracks which requests belong to a user who already completed an OAuth
//! handshake, so the expensive store-backed load runs once per login rather
//! than once per request, and drives the two-step dance: redirect to the
//! provider, receive the callback, exchange the code for a session.
//!
//! # Components
//!
//! - [`flow`] — authorization-code primitives: state nonces, PKCE, URL
//!   building, token exchange/refresh
//! - [`provider`] — provider endpoint presets
//! - [`settings`] — client settings and the [`AuthSettings`] collaborator
//!   contract
//! - [`session`] — the verified [`OAuthSession`] entity
//! - [`login`] — [`LoginManager`]: the fast check, the login/callback state
//!   machine, and the session accessor

pub mod error;
pub mod flow;
pub mod login;
pub mod provider;
pub mod session;
pub mod settings;

pub use error::{OAuthError, Result};
pub use flow::{PkceChallenge, TokenSet};
pub use login::{LoginManager, PreconditionMode, RequestAuth};
pub use provider::ProviderEndpoints;
pub use session::OAuthSession;
pub use settings::{AuthSettings, OAuthSettings};
