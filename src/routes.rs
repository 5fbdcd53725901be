//! Route table and handlers.
//!
//! | Verb | Path | Auth |
//! |---|---|---|
//! | GET | `/` | |
//! | GET, POST | `/new` | yes |
//! | GET, POST | `/sign_in` | |
//! | POST | `/sign_out` | |
//! | GET | `/{file}` | |
//! | GET | `/{file}/edit` | yes |
//! | POST | `/{file}` | yes |
//! | POST | `/{file}/delete` | yes |
//!
//! Handlers that need a signed-in user bail out through [`require_sign_in`]
//! before touching the store.

use tracing::{error, info};

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::StoreError;
use crate::{render, views};

pub fn router() -> Router {
    Router::new()
        .get("/", index)
        .get("/new", new_form)
        .post("/new", create)
        .get("/sign_in", sign_in_form)
        .post("/sign_in", sign_in)
        .post("/sign_out", sign_out)
        .get("/{file}", show)
        .get("/{file}/edit", edit_form)
        .post("/{file}", update)
        .post("/{file}/delete", delete)
}

/// Disk failures. Everything a user can cause is handled before this point.
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        error!("document store failure: {self}");
        Response::builder()
            .status(Status::InternalServerError)
            .text("Internal Server Error")
    }
}

fn redirect_with_error(req: &Request, message: impl Into<String>) -> Response {
    req.session().flash_error(message);
    Response::redirect("/")
}

/// `Err` holds the redirect to send when nobody is signed in.
fn require_sign_in(req: &Request) -> Result<(), Response> {
    if req.session().is_signed_in() {
        Ok(())
    } else {
        Err(redirect_with_error(req, "You must be signed in to do that."))
    }
}

fn file_param(req: &Request) -> String {
    req.param("file").unwrap_or_default().to_owned()
}

fn missing(req: &Request, name: &str) -> Response {
    redirect_with_error(req, format!("{name} does not exist."))
}

// GET /
async fn index(req: Request) -> Result<Response, StoreError> {
    let names = req.state().documents.list().await?;
    Ok(Response::html(views::index(req.session(), &names)))
}

// GET /new
async fn new_form(req: Request) -> Response {
    if let Err(redirect) = require_sign_in(&req) {
        return redirect;
    }
    Response::html(views::new_document(req.session(), "", None))
}

// POST /new
async fn create(req: Request) -> Result<Response, StoreError> {
    if let Err(redirect) = require_sign_in(&req) {
        return Ok(redirect);
    }
    let form = req.form();
    let name = form.get("file_name").unwrap_or_default().trim();

    match req.state().documents.create_empty(name).await {
        Ok(()) => {
            info!(document = name, "created");
            req.session().flash_success(format!("{name} was created."));
            Ok(Response::redirect("/"))
        }
        Err(e) if e.is_validation() => Ok(Response::builder()
            .status(Status::UnprocessableContent)
            .html(views::new_document(req.session(), name, Some(&e.to_string())))),
        Err(e) => Err(e),
    }
}

// GET /sign_in
async fn sign_in_form(req: Request) -> Response {
    Response::html(views::sign_in(req.session(), "", None))
}

// POST /sign_in
async fn sign_in(req: Request) -> Response {
    let form = req.form();
    let username = form.get("username").unwrap_or_default();
    let password = form.get("password").unwrap_or_default();

    if req.state().credentials.validate(username, password).await {
        info!(user = username, "signed in");
        req.session().sign_in(username);
        req.session().flash_success("Welcome!");
        Response::redirect("/")
    } else {
        info!(user = username, "rejected sign-in");
        Response::builder()
            .status(Status::UnprocessableContent)
            .html(views::sign_in(req.session(), username, Some("Invalid credentials.")))
    }
}

// POST /sign_out
async fn sign_out(req: Request) -> Response {
    req.session().sign_out();
    req.session().flash_success("You have been signed out.");
    Response::redirect("/")
}

// GET /{file}
async fn show(req: Request) -> Result<Response, StoreError> {
    let name = file_param(&req);
    match req.state().documents.read(&name).await {
        Ok(content) => Ok(render::render(&name, content, req.session())),
        Err(StoreError::NotFound(_)) => Ok(missing(&req, &name)),
        Err(e) => Err(e),
    }
}

// GET /{file}/edit
async fn edit_form(req: Request) -> Result<Response, StoreError> {
    if let Err(redirect) = require_sign_in(&req) {
        return Ok(redirect);
    }
    let name = file_param(&req);
    match req.state().documents.read(&name).await {
        Ok(content) => {
            let content = String::from_utf8_lossy(&content);
            Ok(Response::html(views::edit_document(req.session(), &name, &content)))
        }
        Err(StoreError::NotFound(_)) => Ok(missing(&req, &name)),
        Err(e) => Err(e),
    }
}

// POST /{file}
async fn update(req: Request) -> Result<Response, StoreError> {
    if let Err(redirect) = require_sign_in(&req) {
        return Ok(redirect);
    }
    let name = file_param(&req);
    let documents = &req.state().documents;
    if !documents.exists(&name).await? {
        return Ok(missing(&req, &name));
    }

    let form = req.form();
    let content = form.get("content").unwrap_or_default();
    documents.write(&name, content.as_bytes()).await?;
    info!(document = %name, bytes = content.len(), "updated");
    req.session().flash_success(format!("{name} has been updated."));
    Ok(Response::redirect("/"))
}

// POST /{file}/delete
async fn delete(req: Request) -> Result<Response, StoreError> {
    if let Err(redirect) = require_sign_in(&req) {
        return Ok(redirect);
    }
    let name = file_param(&req);
    match req.state().documents.delete(&name).await {
        Ok(()) => {
            info!(document = %name, "deleted");
            req.session().flash_success(format!("{name} has been deleted."));
            Ok(Response::redirect("/"))
        }
        Err(StoreError::NotFound(_)) => Ok(missing(&req, &name)),
        Err(e) => Err(e),
    }
}
