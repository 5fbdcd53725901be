//! Document rendering, selected by file extension.

use std::path::Path;

use pulldown_cmark::{Options, Parser, html};

use crate::response::{ContentType, Response};
use crate::session::Session;
use crate::views;

/// How a document is presented to the browser.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    /// Converted to HTML and shown inside the site layout.
    Markdown,
    /// Sent back byte for byte as `text/plain`.
    Text,
}

impl Format {
    pub fn for_name(name: &str) -> Self {
        match Path::new(name).extension().and_then(|ext| ext.to_str()) {
            Some("md") => Self::Markdown,
            _ => Self::Text,
        }
    }
}

/// Markdown → HTML with strikethrough support.
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Builds the response showing document `name`.
///
/// Markdown pages go through the layout and therefore consume pending flash
/// messages from `session`; plain text does not.
pub fn render(name: &str, content: Vec<u8>, session: &Session) -> Response {
    match Format::for_name(name) {
        Format::Markdown => {
            let body = markdown_to_html(&String::from_utf8_lossy(&content));
            Response::html(views::document(session, name, &body))
        }
        Format::Text => Response::builder().bytes(ContentType::Text, content),
    }
}
