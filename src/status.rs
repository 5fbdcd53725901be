//! HTTP status codes as a typed enum.
//!
//! Only the codes folio actually answers with. Use [`Status`] anywhere a
//! status code is accepted: `Response::status()`, `Response::builder().status()`,
//! or as a bare handler return value.

/// The status codes folio produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200

    // ── 3xx Redirection ───────────────────────────────────────────────────────
    Found,                // 302

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    UnprocessableContent, // 422

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                   => 200,
            Status::Found                => 302,
            Status::BadRequest           => 400,
            Status::NotFound             => 404,
            Status::MethodNotAllowed     => 405,
            Status::UnprocessableContent => 422,
            Status::InternalServerError  => 500,
        }
    }
}
