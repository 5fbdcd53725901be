//! Radix-tree request router.
//!
//! One tree per HTTP method. Static segments win over parameters, so `/new`
//! is never mistaken for a document called `new`.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// Result of looking up a method + path pair.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    /// The path exists, but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// The application router.
///
/// Build it once at startup. Each registration returns `self` so calls chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a GET handler. Path parameters use `{name}` syntax;
    /// `req.param("name")` retrieves them. HEAD requests are answered by GET
    /// handlers unless a HEAD route is registered.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.add(Method::Post, path, handler)
    }

    fn add(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        let tree = match (self.routes.get(&method), method) {
            (None, Method::Head) => self.routes.get(&Method::Get),
            (tree, _) => tree,
        };
        if let Some(matched) = tree.and_then(|tree| tree.at(path).ok()) {
            let handler = Arc::clone(matched.value);
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
                .collect();
            return Lookup::Found(handler, params);
        }
        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
