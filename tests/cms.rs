//! End-to-end tests driving the whole app in process.

use std::path::Path;

use bytes::Bytes;
use http::HeaderMap;
use http_body_util::BodyExt;
use tempfile::TempDir;

use folio::{App, COOKIE_NAME, Credentials, DocumentStore};

struct TestResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    fn location(&self) -> Option<&str> {
        self.headers.get("location").and_then(|v| v.to_str().ok())
    }

    fn content_type(&self) -> &str {
        self.headers.get("content-type").and_then(|v| v.to_str().ok()).unwrap_or_default()
    }
}

/// One browser talking to one app instance.
struct Client {
    app: App,
    dir: TempDir,
    session: Option<String>,
}

impl Client {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.md"), "## About\n\nA ~~tiny~~ small CMS.\n").unwrap();
        std::fs::write(dir.path().join("changes.txt"), "Nothing changed yet.\n").unwrap();
        std::fs::write(
            dir.path().join("history.txt"),
            "1993 - Yukihiro Matsumoto dreams up Ruby.\n1995 - Ruby 0.95 released.\n",
        )
        .unwrap();

        let hash = bcrypt::hash("secret", 4).unwrap();
        let credentials = Credentials::from_yaml(&format!("admin: \"{hash}\"\n")).unwrap();
        let documents = DocumentStore::open(dir.path()).await.unwrap();

        Self { app: App::new(documents, credentials), dir, session: None }
    }

    fn data(&self) -> &Path {
        self.dir.path()
    }

    async fn send(&mut self, method: &str, path: &str, body: Bytes) -> TestResponse {
        let mut builder = http::Request::builder().method(method).uri(path);
        if !body.is_empty() {
            builder = builder.header("content-type", "application/x-www-form-urlencoded");
        }
        if let Some(id) = &self.session {
            builder = builder.header("cookie", format!("{COOKIE_NAME}={id}"));
        }
        let res = self.app.handle(builder.body(body).unwrap()).await;

        if let Some(cookie) = res.headers().get("set-cookie") {
            let cookie = cookie.to_str().unwrap();
            let pair = cookie.split(';').next().unwrap();
            let (name, id) = pair.split_once('=').unwrap();
            assert_eq!(name, COOKIE_NAME);
            self.session = Some(id.to_owned());
        }

        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse { status, headers, body: String::from_utf8(bytes.to_vec()).unwrap() }
    }

    async fn get(&mut self, path: &str) -> TestResponse {
        self.send("GET", path, Bytes::new()).await
    }

    async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.send("POST", path, Bytes::from(body)).await
    }

    async fn sign_in(&mut self) {
        let res = self.post("/sign_in", &[("username", "admin"), ("password", "secret")]).await;
        assert_eq!(res.status, 302);
    }
}

#[tokio::test]
async fn index_lists_documents() {
    let mut client = Client::new().await;
    let res = client.get("/").await;

    assert_eq!(res.status, 200);
    assert_eq!(res.content_type(), "text/html; charset=utf-8");
    assert!(res.body.contains("about.md"));
    assert!(res.body.contains("changes.txt"));
    assert!(res.body.contains("history.txt"));
}

#[tokio::test]
async fn text_documents_are_served_verbatim() {
    let mut client = Client::new().await;
    let res = client.get("/history.txt").await;

    assert_eq!(res.status, 200);
    assert!(res.content_type().starts_with("text/plain"));
    assert!(res.body.contains("1993 - Yukihiro Matsumoto dreams up Ruby."));
    assert!(res.body.contains("1995 - Ruby 0.95 released."));
}

#[tokio::test]
async fn markdown_documents_are_rendered() {
    let mut client = Client::new().await;
    let res = client.get("/about.md").await;

    assert_eq!(res.status, 200);
    assert!(res.content_type().starts_with("text/html"));
    assert!(res.body.contains("<h2>About</h2>"));
    assert!(res.body.contains("<del>tiny</del>"));
}

#[tokio::test]
async fn missing_document_flashes_once() {
    let mut client = Client::new().await;
    let res = client.get("/nothing-here.txt").await;
    assert_eq!(res.status, 302);
    assert_eq!(res.location(), Some("/"));

    let res = client.get("/").await;
    assert_eq!(res.status, 200);
    assert!(res.body.contains("nothing-here.txt does not exist."));

    let res = client.get("/").await;
    assert!(!res.body.contains("nothing-here.txt does not exist."));
}

#[tokio::test]
async fn sign_in_with_wrong_password_keeps_username() {
    let mut client = Client::new().await;
    let res = client.post("/sign_in", &[("username", "admin"), ("password", "wrong")]).await;

    assert_eq!(res.status, 422);
    assert!(res.body.contains("Invalid credentials."));
    assert!(res.body.contains("value=\"admin\""));
}

#[tokio::test]
async fn sign_in_and_out() {
    let mut client = Client::new().await;
    let form = client.get("/sign_in").await;
    assert_eq!(form.status, 200);
    assert!(form.body.contains("name=\"password\""));

    client.sign_in().await;
    let res = client.get("/").await;
    assert!(res.body.contains("Welcome!"));
    assert!(res.body.contains("Signed in as admin."));

    let res = client.post("/sign_out", &[]).await;
    assert_eq!(res.status, 302);
    let res = client.get("/").await;
    assert!(res.body.contains("You have been signed out."));
    assert!(res.body.contains("Sign In"));
    assert!(!res.body.contains("Signed in as admin."));
}

#[tokio::test]
async fn signed_out_users_cannot_change_anything() {
    let mut client = Client::new().await;

    for (method, path) in [
        ("GET", "/new"),
        ("POST", "/new"),
        ("GET", "/changes.txt/edit"),
        ("POST", "/changes.txt"),
        ("POST", "/changes.txt/delete"),
    ] {
        let res = match method {
            "GET" => client.get(path).await,
            _ => client.post(path, &[("file_name", "evil.txt"), ("content", "pwned")]).await,
        };
        assert_eq!(res.status, 302, "{method} {path}");
        assert_eq!(res.location(), Some("/"));

        let res = client.get("/").await;
        assert!(res.body.contains("You must be signed in to do that."), "{method} {path}");
    }

    assert!(!client.data().join("evil.txt").exists());
    assert!(client.data().join("changes.txt").exists());
    assert_eq!(
        std::fs::read_to_string(client.data().join("changes.txt")).unwrap(),
        "Nothing changed yet.\n",
    );
}

#[tokio::test]
async fn creating_with_an_empty_name_is_rejected() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let form = client.get("/new").await;
    assert_eq!(form.status, 200);
    assert!(form.body.contains("name=\"file_name\""));

    let res = client.post("/new", &[("file_name", "   ")]).await;
    assert_eq!(res.status, 422);
    assert!(res.body.contains("A name is required."));
    assert_eq!(std::fs::read_dir(client.data()).unwrap().count(), 3);
}

#[tokio::test]
async fn creating_a_document_lists_it() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let res = client.post("/new", &[("file_name", " notes.md ")]).await;
    assert_eq!(res.status, 302);
    assert_eq!(res.location(), Some("/"));
    assert!(client.data().join("notes.md").exists());

    let res = client.get("/").await;
    assert!(res.body.contains("notes.md was created."));
    assert!(res.body.contains("href=\"/notes.md\""));
}

#[tokio::test]
async fn creating_rejects_taken_and_unsafe_names() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let res = client.post("/new", &[("file_name", "about.md")]).await;
    assert_eq!(res.status, 422);
    assert!(res.body.contains("about.md already exists."));

    let res = client.post("/new", &[("file_name", "../escape.txt")]).await;
    assert_eq!(res.status, 422);
    assert!(!client.data().parent().unwrap().join("escape.txt").exists());
}

#[tokio::test]
async fn names_with_spaces_round_trip_through_urls() {
    let mut client = Client::new().await;
    client.sign_in().await;

    client.post("/new", &[("file_name", "my notes.txt")]).await;
    let res = client.get("/").await;
    assert!(res.body.contains("href=\"/my%20notes.txt\""));

    let res = client.get("/my%20notes.txt").await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn editing_round_trips_content() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let form = client.get("/changes.txt/edit").await;
    assert_eq!(form.status, 200);
    assert!(form.body.contains("<textarea"));
    assert!(form.body.contains("Nothing changed yet."));

    let content = "Line one\r\nLine <two> & three";
    let res = client.post("/changes.txt", &[("content", content)]).await;
    assert_eq!(res.status, 302);

    let res = client.get("/").await;
    assert!(res.body.contains("changes.txt has been updated."));

    let res = client.get("/changes.txt").await;
    assert_eq!(res.body, content);
}

#[tokio::test]
async fn editing_a_missing_document_does_not_create_it() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let res = client.get("/ghost.txt/edit").await;
    assert_eq!(res.status, 302);

    let res = client.post("/ghost.txt", &[("content", "boo")]).await;
    assert_eq!(res.status, 302);
    assert!(!client.data().join("ghost.txt").exists());

    let res = client.get("/").await;
    assert!(res.body.contains("ghost.txt does not exist."));
}

#[tokio::test]
async fn deleting_removes_from_listing() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let res = client.post("/history.txt/delete", &[]).await;
    assert_eq!(res.status, 302);
    assert!(!client.data().join("history.txt").exists());

    let res = client.get("/").await;
    assert!(res.body.contains("history.txt has been deleted."));
    assert!(!res.body.contains("href=\"/history.txt\""));
}

#[tokio::test]
async fn deleting_a_missing_document_flashes_an_error() {
    let mut client = Client::new().await;
    client.sign_in().await;

    let res = client.post("/ghost.txt/delete", &[]).await;
    assert_eq!(res.status, 302);
    let res = client.get("/").await;
    assert!(res.body.contains("ghost.txt does not exist."));
}

#[tokio::test]
async fn unknown_routes_and_methods() {
    let mut client = Client::new().await;

    let res = client.get("/a/b/c").await;
    assert_eq!(res.status, 404);

    let res = client.send("PUT", "/", Bytes::new()).await;
    assert_eq!(res.status, 405);
}

#[tokio::test]
async fn browsing_without_flash_sets_no_cookie() {
    let mut client = Client::new().await;
    client.get("/").await;
    client.get("/about.md").await;
    assert_eq!(client.session, None);
}

#[tokio::test]
async fn disk_failures_surface_as_server_errors() {
    let mut client = Client::new().await;
    client.sign_in().await;
    std::fs::remove_dir_all(client.data()).unwrap();

    let res = client.get("/").await;
    assert_eq!(res.status, 500);

    let res = client.post("/new", &[("file_name", "fresh.txt")]).await;
    assert_eq!(res.status, 500);
    assert!(!client.data().exists());
}

#[tokio::test]
async fn signing_in_replaces_the_session_id() {
    let mut client = Client::new().await;
    client.get("/missing.txt").await;
    let before = client.session.clone().expect("cookie issued with the flash");

    client.sign_in().await;
    let after = client.session.clone().unwrap();
    assert_ne!(before, after);

    client.session = Some(before);
    let res = client.get("/new").await;
    assert_eq!(res.status, 302);
    assert_eq!(res.location(), Some("/"));
}

#[tokio::test]
async fn head_requests_get_headers_only() {
    let mut client = Client::new().await;
    let res = client.send("HEAD", "/history.txt", Bytes::new()).await;
    assert_eq!(res.status, 200);
    assert!(res.content_type().starts_with("text/plain"));
    assert!(res.body.is_empty());
}
