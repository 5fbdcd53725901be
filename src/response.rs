//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] and return it. The app turns it into a hyper
//! response at the very end, after the session cookie has been attached.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http_body_util::Full;
use tracing::warn;

use crate::status::Status;

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content-type values folio serves, for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Html, // text/html; charset=utf-8
    Text, // text/plain; charset=utf-8
}

impl ContentType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use folio::{Response, Status};
///
/// Response::html("<p>hello</p>");
/// Response::text("hello");
/// Response::redirect("/");
/// Response::status(Status::NotFound);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use folio::{ContentType, Response, Status};
///
/// Response::builder()
///     .status(Status::UnprocessableContent)
///     .html("<p>A name is required.</p>");
///
/// Response::builder()
///     .bytes(ContentType::Text, b"raw".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: u16,
}

impl Response {
    /// `200 OK` — `text/html; charset=utf-8`.
    pub fn html(body: impl Into<String>) -> Self {
        Self::bytes_raw(ContentType::Html.as_str(), body.into().into_bytes())
    }

    /// `200 OK` — `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::bytes_raw(ContentType::Text.as_str(), body.into().into_bytes())
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        Self::builder()
            .status(Status::Found)
            .header("location", location)
            .no_body()
    }

    /// Response with no body.
    pub fn status(code: Status) -> Self {
        Self { body: Vec::new(), headers: Vec::new(), status: code.into() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: Vec::new(), status: Status::Ok.into() }
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Appends a header after the fact (used for `set-cookie`).
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((name.to_owned(), value.into()));
    }

    fn bytes_raw(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            body,
            headers: vec![("content-type".to_owned(), content_type.to_owned())],
            status: Status::Ok.into(),
        }
    }

    /// Converts into the hyper representation. Headers that are not valid on
    /// the wire are dropped with a warning.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = http::StatusCode::from_u16(self.status)
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::try_from(value.as_str())) {
                (Ok(name), Ok(value)) => {
                    res.headers_mut().append(name, value);
                }
                _ => warn!(header = %name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method — you always know what you're sending.
pub struct ResponseBuilder {
    headers: Vec<(String, String)>,
    status: u16,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Terminate with an HTML body (`text/html; charset=utf-8`).
    pub fn html(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Html.as_str(), body.into().into_bytes())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text.as_str(), body.into().into_bytes())
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: Vec<u8>) -> Response {
        self.finish(content_type.as_str(), body)
    }

    /// Terminate with no body (e.g. redirects).
    pub fn no_body(self) -> Response {
        Response { body: Vec::new(), headers: self.headers, status: self.status }
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let mut headers = vec![("content-type".to_owned(), content_type.to_owned())];
        headers.extend(self.headers);
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Anything a handler returns must implement this. `Result<T, E>` works when
/// both sides do, which lets handlers use `?` on store operations.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a [`Status`] directly from a handler: `return Status::NotFound`
impl IntoResponse for Status {
    fn into_response(self) -> Response { Response::status(self) }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(v) => v.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_sets_location() {
        let res = Response::redirect("/");
        assert_eq!(res.status_code(), 302);
        assert_eq!(res.header("Location"), Some("/"));
        assert!(res.body().is_empty());
    }

    #[test]
    fn builder_keeps_content_type_first() {
        let res = Response::builder()
            .status(Status::UnprocessableContent)
            .header("x-extra", "1")
            .html("<p>no</p>");
        assert_eq!(res.status_code(), 422);
        assert_eq!(res.headers[0].0, "content-type");
        assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn into_inner_drops_invalid_headers() {
        let mut res = Response::text("ok");
        res.append_header("set-cookie", "a=b");
        res.append_header("bad header", "x");
        let inner = res.into_inner();
        assert_eq!(inner.status(), http::StatusCode::OK);
        assert_eq!(inner.headers()["set-cookie"], "a=b");
        assert_eq!(inner.headers().len(), 2);
    }

    #[test]
    fn results_convert_through_either_side() {
        let ok: Result<Response, Status> = Ok(Response::text("fine"));
        assert_eq!(ok.into_response().status_code(), 200);
        let err: Result<Response, Status> = Err(Status::NotFound);
        assert_eq!(err.into_response().status_code(), 404);
    }
}
