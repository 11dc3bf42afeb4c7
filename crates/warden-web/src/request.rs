//! Request and response seams the login layer drives.

use crate::session::ServerSession;

/// The incoming request as the login layer sees it.
///
/// Hosts adapt their framework's request type behind this trait. Only three
/// capabilities are needed: access to the request's session (if one exists),
/// the ability to start one, and read access to query parameters.
pub trait WebRequest {
    /// The host's session type.
    type Session: ServerSession;

    /// The session attached to this request, if any.
    fn session(&self) -> Option<&Self::Session>;

    /// Mutable access to the attached session, if any.
    fn session_mut(&mut self) -> Option<&mut Self::Session>;

    /// Return the attached session, starting a new one first if the request
    /// has none. Hosts whose session creation is response-driven (cookie
    /// issuance) perform that bookkeeping inside this call.
    fn start_session(&mut self) -> &mut Self::Session;

    /// A query-string parameter by name.
    fn query_param(&self, name: &str) -> Option<&str>;
}

/// The outgoing response as the login layer sees it.
pub trait WebResponse {
    /// Redirect the client to `location`.
    fn redirect(&mut self, location: &str);
}
