//! Session acquisition
//!
//! An [`Authenticator`] turns [`Credentials`] into a [`Session`]; the session
//! is then handed explicitly to a [`Renderer`](crate::render::Renderer) for
//! every page fetch. Two strategies exist: plain HTTP with a cookie jar
//! ([`http`]) and a real browser tab ([`browser`]).

pub mod browser;
pub mod form;
pub mod http;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::credentials::Credentials;
use crate::errors::AuthError;

pub use browser::{BrowserAuthenticator, BrowserSession};
pub use http::{HttpAuthenticator, HttpSession};

/// Authenticated handle to the site
pub trait Session {
    /// When the login that produced this session completed
    fn acquired_at(&self) -> DateTime<Utc>;

    /// Lightweight "still logged in" probe. Errors count as `false`.
    fn verify(&self) -> impl Future<Output = bool>;

    /// Release whatever the session holds open (a browser tab, for instance)
    fn close(self) -> impl Future<Output = ()>;
}

/// Establishes sessions
pub trait Authenticator {
    type Session: Session;

    /// Log in and return a fresh session
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Self::Session, AuthError>>;
}
