//! # folio
//!
//! A small document manager served over HTTP. Nothing more.
//!
//! folio lists the files of one directory, shows them (markdown rendered to
//! HTML, everything else as plain text), and lets a signed-in user create,
//! edit and delete them. Users come from a static YAML file of bcrypt hashes.
//!
//! ## Pieces
//!
//! - Radix-tree routing via [`matchit`], one tree per method
//! - hyper server with graceful shutdown on SIGTERM / Ctrl-C
//! - [`DocumentStore`]: the file name is the document's identity
//! - [`SessionStore`]: cookie-keyed, in-memory, expiring, one-shot flash messages
//! - [`render`]: extension-selected output, markdown via `pulldown-cmark`
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use folio::{App, Credentials, DocumentStore, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), folio::Error> {
//!     let documents = DocumentStore::open("./data").await?;
//!     let credentials = Credentials::load(Path::new("./users.yml"))?;
//!
//!     Server::bind("127.0.0.1:4567".parse().unwrap())
//!         .serve(App::new(documents, credentials))
//!         .await
//! }
//! ```

mod app;
mod auth;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod routes;
mod server;
mod session;
mod status;
mod store;

pub mod render;
pub mod views;

pub use app::{App, AppState};
pub use auth::Credentials;
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use request::{Form, Request};
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
pub use session::{COOKIE_NAME, DEFAULT_MAX_SESSIONS, DEFAULT_TTL, Flash, Session, SessionData, SessionStore};
pub use status::Status;
pub use store::{DocumentStore, StoreError, validate_name};
