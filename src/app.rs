//! The application: routing plus the session round-trip around each handler.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use tracing::info;

use crate::auth::Credentials;
use crate::method::Method;
use crate::request::{Request, cookie};
use crate::response::Response;
use crate::router::{Lookup, Router};
use crate::routes;
use crate::session::{COOKIE_NAME, SessionStore, set_cookie};
use crate::status::Status;
use crate::store::DocumentStore;
use crate::views;

/// State shared by every request.
#[derive(Debug)]
pub struct AppState {
    pub documents: DocumentStore,
    pub credentials: Credentials,
}

/// A ready-to-serve folio instance.
///
/// [`App::handle`] takes a fully collected request, so tests can drive the
/// whole application without opening a socket.
pub struct App {
    router: Router,
    sessions: SessionStore,
    state: Arc<AppState>,
}

impl App {
    pub fn new(documents: DocumentStore, credentials: Credentials) -> Self {
        Self {
            router: routes::router(),
            sessions: SessionStore::new(),
            state: Arc::new(AppState { documents, credentials }),
        }
    }

    /// Replaces the default session store, e.g. to change its TTL.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Routes one request and produces one response.
    pub async fn handle(&self, req: http::Request<Bytes>) -> http::Response<Full<Bytes>> {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let session_id = parts.headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| cookie(v, COOKIE_NAME))
            .map(str::to_owned);
        let session = self.sessions.load(session_id.as_deref());

        let mut response = match parts.method.as_str().parse::<Method>() {
            Err(()) => Response::status(Status::MethodNotAllowed),
            Ok(method) => match self.router.lookup(method, &path) {
                Lookup::Found(handler, params) => {
                    let req = Request {
                        body,
                        params,
                        session: session.clone(),
                        state: Arc::clone(&self.state),
                    };
                    handler.call(req).await
                }
                Lookup::MethodNotAllowed => Response::status(Status::MethodNotAllowed),
                Lookup::NotFound => Response::builder()
                    .status(Status::NotFound)
                    .html(views::not_found(&session)),
            },
        };

        if parts.method == http::Method::HEAD {
            response.body.clear();
        }
        if let Some(id) = self.sessions.commit(session_id.as_deref(), &session) {
            response.append_header("set-cookie", set_cookie(&id));
        }

        info!(
            method = %parts.method,
            path = %path,
            status = response.status_code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
        response.into_inner()
    }
}
