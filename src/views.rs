//! HTML pages.
//!
//! Every page goes through [`layout`], which shows and consumes the session's
//! flash messages and the sign-in status.

use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::session::Session;

/// Characters left as-is when a document name is placed in a URL path.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'-').remove(b'_').remove(b'~');

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// URL path of document `name`, optionally followed by an action segment.
pub fn document_url(name: &str, action: Option<&str>) -> String {
    let mut url = format!("/{}", utf8_percent_encode(name, PATH_SAFE));
    if let Some(action) = action {
        url.push('/');
        url.push_str(action);
    }
    url
}

fn layout(session: &Session, title: &str, main: &str) -> String {
    let flash = session.take_flash();
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n",
        escape_html(title),
    );
    if let Some(error) = flash.error {
        let _ = writeln!(html, "<p class=\"flash error\">{}</p>", escape_html(&error));
    }
    if let Some(success) = flash.success {
        let _ = writeln!(html, "<p class=\"flash success\">{}</p>", escape_html(&success));
    }
    html.push_str("<main>\n");
    html.push_str(main);
    html.push_str("</main>\n<footer>\n");
    match session.user().filter(|_| session.is_signed_in()) {
        Some(user) => {
            let _ = writeln!(
                html,
                "<form method=\"post\" action=\"/sign_out\"><p>Signed in as {}. <button type=\"submit\">Sign Out</button></p></form>",
                escape_html(&user),
            );
        }
        None => html.push_str("<p><a href=\"/sign_in\">Sign In</a></p>\n"),
    }
    html.push_str("</footer>\n</body>\n</html>\n");
    html
}

/// The document list.
pub fn index(session: &Session, names: &[String]) -> String {
    let signed_in = session.is_signed_in();
    let mut main = String::from("<ul>\n");
    for name in names {
        let label = escape_html(name);
        let _ = write!(main, "<li><a href=\"{}\">{label}</a>", document_url(name, None));
        if signed_in {
            let _ = write!(
                main,
                " <a href=\"{}\">edit</a> <form class=\"inline\" method=\"post\" action=\"{}\"><button type=\"submit\">delete</button></form>",
                document_url(name, Some("edit")),
                document_url(name, Some("delete")),
            );
        }
        main.push_str("</li>\n");
    }
    main.push_str("</ul>\n<p><a href=\"/new\">New Document</a></p>\n");
    layout(session, "Documents", &main)
}

/// Form for a new, empty document. `error` is shown inline above the field.
pub fn new_document(session: &Session, file_name: &str, error: Option<&str>) -> String {
    let mut main = String::new();
    if let Some(error) = error {
        let _ = writeln!(main, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = write!(
        main,
        "<form method=\"post\" action=\"/new\">\n<label for=\"file_name\">Add a new document:</label>\n<input id=\"file_name\" name=\"file_name\" value=\"{}\">\n<button type=\"submit\">Create</button>\n</form>\n",
        escape_html(file_name),
    );
    layout(session, "New Document", &main)
}

pub fn edit_document(session: &Session, name: &str, content: &str) -> String {
    let main = format!(
        "<form method=\"post\" action=\"{}\">\n<label for=\"content\">Edit content of {}:</label>\n<textarea id=\"content\" name=\"content\" rows=\"20\" cols=\"80\">{}</textarea>\n<button type=\"submit\">Save Changes</button>\n</form>\n",
        document_url(name, None),
        escape_html(name),
        escape_html(content),
    );
    layout(session, &format!("Edit {name}"), &main)
}

/// Sign-in form. `username` is echoed back after a failed attempt.
pub fn sign_in(session: &Session, username: &str, error: Option<&str>) -> String {
    let mut main = String::new();
    if let Some(error) = error {
        let _ = writeln!(main, "<p class=\"error\">{}</p>", escape_html(error));
    }
    let _ = write!(
        main,
        "<form method=\"post\" action=\"/sign_in\">\n<label for=\"username\">Username</label>\n<input id=\"username\" name=\"username\" value=\"{}\">\n<label for=\"password\">Password</label>\n<input id=\"password\" name=\"password\" type=\"password\">\n<button type=\"submit\">Sign In</button>\n</form>\n",
        escape_html(username),
    );
    layout(session, "Sign In", &main)
}

/// A rendered markdown document. `body` is trusted HTML.
pub fn document(session: &Session, name: &str, body: &str) -> String {
    layout(session, name, body)
}

pub fn not_found(session: &Session) -> String {
    layout(session, "Not Found", "<p>There is nothing here.</p>\n<p><a href=\"/\">Back to the documents</a></p>\n")
}
