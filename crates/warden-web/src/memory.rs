//! In-memory host implementations.
//!
//! Used by the test suites and by embedded hosts that have no real HTTP
//! framework underneath (CLI tools driving a login flow, simulations).

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

use crate::request::{WebRequest, WebResponse};
use crate::session::ServerSession;

fn random_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// In-memory [`ServerSession`].
#[derive(Debug, Clone)]
pub struct MemorySession {
    id: String,
    values: HashMap<String, String>,
}

impl MemorySession {
    /// Create a session with a random identifier.
    pub fn new() -> Self {
        Self::with_id(random_session_id())
    }

    /// Create a session with a fixed identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: HashMap::new(),
        }
    }
}

impl Default for MemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSession for MemorySession {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// In-memory [`WebRequest`].
#[derive(Debug, Default)]
pub struct MemoryRequest {
    session: Option<MemorySession>,
    query: HashMap<String, String>,
}

impl MemoryRequest {
    /// A request with no session and no query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session.
    pub fn with_session(mut self, session: MemorySession) -> Self {
        self.session = Some(session);
        self
    }

    /// Add a query-string parameter.
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }
}

impl WebRequest for MemoryRequest {
    type Session = MemorySession;

    fn session(&self) -> Option<&MemorySession> {
        self.session.as_ref()
    }

    fn session_mut(&mut self) -> Option<&mut MemorySession> {
        self.session.as_mut()
    }

    fn start_session(&mut self) -> &mut MemorySession {
        self.session.get_or_insert_with(MemorySession::new)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// In-memory [`WebResponse`] that records redirects.
#[derive(Debug, Default)]
pub struct MemoryResponse {
    redirects: Vec<String>,
}

impl MemoryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent redirect target, if any.
    pub fn redirected_to(&self) -> Option<&str> {
        self.redirects.last().map(String::as_str)
    }

    /// Every redirect issued on this response, in order.
    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }
}

impl WebResponse for MemoryResponse {
    fn redirect(&mut self, location: &str) {
        self.redirects.push(location.to_string());
    }
}
