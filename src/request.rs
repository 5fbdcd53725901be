//! Incoming HTTP request type.
//!
//! Besides the body and path parameters, a [`Request`] is the per-request
//! context handed to every handler: it carries the caller's [`Session`] and
//! the shared [`AppState`].

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use crate::app::AppState;
use crate::session::Session;

/// An incoming HTTP request with its body already collected.
///
/// Handlers only ever look at the form body and the path parameters, so
/// nothing else is kept.
pub struct Request {
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) session: Session,
    pub(crate) state: Arc<AppState>,
}

impl Request {
    pub fn session(&self) -> &Session { &self.session }
    pub fn state(&self) -> &AppState { &self.state }

    /// Returns a named, percent-decoded path parameter.
    ///
    /// For a route `/{file}`, `req.param("file")` on `/about%20us.md` returns
    /// `Some("about us.md")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> Form {
        Form::parse(&self.body)
    }
}

/// Returns the value of cookie `name` from a raw `Cookie` header.
pub(crate) fn cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Decoded form fields. Later duplicates of a key win.
#[derive(Debug, Default)]
pub struct Form(HashMap<String, String>);

impl Form {
    pub fn parse(body: &[u8]) -> Self {
        Self(form_urlencoded::parse(body).into_owned().collect())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}
