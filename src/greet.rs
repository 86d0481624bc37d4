//! The greeting handlers.
//!
//! | Route | Body |
//! |---|---|
//! | `GET /` | `Hello World: Earth. what is up?` |
//! | `GET /greet/{name}` | `Hello {name}!` |
//!
//! `name` is the percent-decoded path segment, echoed as is. The body is
//! `text/plain`, so nothing is escaped; a handler that renders it into HTML
//! would have to.

use crate::{Request, Response};

pub const HELLO: &str = "Hello World: Earth. what is up?";

/// `GET /`
pub async fn hello(_req: Request) -> Response {
    Response::text(HELLO)
}

/// `GET /greet/{name}`
pub async fn greet(req: Request) -> Response {
    let name = req.param("name").unwrap_or_default();
    Response::text(format!("Hello {name}!\n"))
}
