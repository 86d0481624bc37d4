//! Path-template request router.
//!
//! One radix tree per HTTP method, O(path-length) lookup via [`matchit`].
//! The router is a pure resolver: it turns `(method, path)` into a [`Match`]
//! (or [`Resolution::NotFound`]) and never calls a handler itself. Invoking
//! the handler, and wrapping it in middleware, belongs to [`App`](crate::App).
//!
//! # Templates
//!
//! A template is a `/`-separated path whose segments are either literal text
//! or one whole-segment placeholder, `{name}`. A placeholder matches exactly
//! one non-empty segment; there are no cross-segment wildcards. Matching
//! runs on the raw path; captured values are percent-decoded afterwards.
//!
//! # Precedence
//!
//! Most specific first, segment by segment: at any position a literal segment
//! beats a placeholder, whatever order the routes were registered in. So with
//! both `/greet/{name}` and `/greet/admin` registered, `/greet/admin` resolves
//! to the literal route. Two templates that differ only in a placeholder's
//! name are a conflict and the second registration fails.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use matchit::Router as MatchitRouter;
use percent_encoding::percent_decode_str;

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;

/// A registered route: a method, a template and the handler behind it.
pub(crate) struct Route {
    method: Method,
    template: Arc<str>,
    pub(crate) handler: BoxedHandler,
}

/// The outcome of a successful [`Router::resolve`].
///
/// Carries the matched template (the metrics label) and the captured
/// placeholder values, in template order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    route: usize,
    template: Arc<str>,
    params: Vec<(String, String)>,
}

impl Match {
    pub fn template(&self) -> &str { &self.template }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn route_id(&self) -> usize { self.route }
}

/// Result of resolving a request. A miss is an ordinary outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Matched(Match),
    NotFound,
}

/// The application router.
///
/// Build it once at startup and hand it to [`App::new`](crate::App::new).
/// Registration validates the template eagerly, so a malformed route fails
/// before the server ever binds.
///
/// ```rust
/// # use tally::{Method, Request, Response, Router};
/// # async fn hello(_: Request) -> Response { Response::text("") }
/// # async fn greet(_: Request) -> Response { Response::text("") }
/// # fn main() -> Result<(), tally::Error> {
/// let router = Router::new()
///     .get("/", hello)?
///     .route(Method::Get, "/greet/{name}", greet)?;
/// # Ok(()) }
/// ```
#[derive(Default)]
pub struct Router {
    trees: HashMap<Method, MatchitRouter<usize>>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + template pair. Returns `self` for chaining.
    pub fn route(mut self, method: Method, template: &str, handler: impl Handler) -> Result<Self, Error> {
        self.register(method, template, handler)?;
        Ok(self)
    }

    /// Shortcut for [`Router::route`] with [`Method::Get`].
    pub fn get(self, template: &str, handler: impl Handler) -> Result<Self, Error> {
        self.route(Method::Get, template, handler)
    }

    /// Register a handler for a method + template pair.
    ///
    /// Fails with [`Error::InvalidRoute`] for a malformed template and with
    /// [`Error::DuplicateRoute`] if the template is already taken for `method`.
    pub fn register(&mut self, method: Method, template: &str, handler: impl Handler) -> Result<(), Error> {
        validate(template)?;

        if self.routes.iter().any(|r| r.method == method && &*r.template == template) {
            return Err(Error::DuplicateRoute { method, template: template.to_owned() });
        }

        let id = self.routes.len();
        self.trees
            .entry(method)
            .or_default()
            .insert(template, id)
            .map_err(|e| Error::invalid_route(template, e.to_string()))?;

        self.routes.push(Route {
            method,
            template: Arc::from(template),
            handler: handler.into_boxed_handler(),
        });
        Ok(())
    }

    /// Resolves `path` against the templates registered for `method`.
    pub fn resolve(&self, method: Method, path: &str) -> Resolution {
        let Some(tree) = self.trees.get(&method) else {
            return Resolution::NotFound;
        };
        let Ok(matched) = tree.at(path) else {
            return Resolution::NotFound;
        };

        if matched.params.iter().any(|(_, v)| v.is_empty()) {
            return Resolution::NotFound;
        }
        // Segments are split on the raw path, so an encoded `%2F` stays inside
        // its segment; only the captured value is decoded.
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), percent_decode_str(v).decode_utf8_lossy().into_owned()))
            .collect();

        let id = *matched.value;
        Resolution::Matched(Match {
            route: id,
            template: Arc::clone(&self.routes[id].template),
            params,
        })
    }

    /// All registered routes, in registration order.
    pub(crate) fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }
}

/// Checks the template grammar before it reaches the radix tree, so every
/// malformed template gets a reason a human can act on.
fn validate(template: &str) -> Result<(), Error> {
    if !template.starts_with('/') {
        return Err(Error::invalid_route(template, "template must start with `/`"));
    }

    let mut names = HashSet::new();
    for segment in template.split('/').skip(1) {
        if !segment.contains(['{', '}']) {
            continue;
        }

        let opens = segment.matches('{').count();
        let closes = segment.matches('}').count();
        if opens != closes {
            return Err(Error::invalid_route(template, format!("unbalanced braces in `{segment}`")));
        }
        if opens > 1 {
            return Err(Error::invalid_route(template, format!("more than one placeholder in `{segment}`")));
        }

        let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Err(Error::invalid_route(
                template,
                format!("placeholder must span the whole segment, got `{segment}`"),
            ));
        };
        if name.is_empty() {
            return Err(Error::invalid_route(template, "empty placeholder `{}`"));
        }
        if name.starts_with('*') {
            return Err(Error::invalid_route(template, format!("catch-all `{segment}` is not supported")));
        }
        if !names.insert(name) {
            return Err(Error::invalid_route(template, format!("placeholder `{name}` appears twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Request, Response};

    async fn noop(_req: Request) -> Response {
        Response::text("")
    }

    fn matched(res: Resolution) -> Match {
        match res {
            Resolution::Matched(m) => m,
            Resolution::NotFound => panic!("expected a match"),
        }
    }

    fn router(templates: &[&str]) -> Router {
        let mut router = Router::new();
        for t in templates {
            router.register(Method::Get, t, noop).unwrap();
        }
        router
    }

    #[test]
    fn substituted_paths_resolve_to_their_template() {
        let router = router(&["/", "/greet/{name}", "/orgs/{org}/repos/{repo}"]);

        let m = matched(router.resolve(Method::Get, "/"));
        assert_eq!(m.template(), "/");
        assert_eq!(m.params().count(), 0);

        for name in ["alice", "Sam", "x", "a.b-c_d"] {
            let m = matched(router.resolve(Method::Get, &format!("/greet/{name}")));
            assert_eq!(m.template(), "/greet/{name}");
            assert_eq!(m.param("name"), Some(name));
        }

        let m = matched(router.resolve(Method::Get, "/orgs/rust-lang/repos/cargo"));
        assert_eq!(m.template(), "/orgs/{org}/repos/{repo}");
        assert_eq!(
            m.params().collect::<Vec<_>>(),
            vec![("org", "rust-lang"), ("repo", "cargo")],
        );
    }

    #[test]
    fn structural_mismatches_are_not_found() {
        let router = router(&["/", "/greet/{name}"]);

        for path in ["/greet", "/greet/a/b", "/hello", "/greet/a/", "/prometheus"] {
            assert_eq!(router.resolve(Method::Get, path), Resolution::NotFound, "{path}");
        }
    }

    #[test]
    fn captured_segment_is_percent_decoded() {
        let router = router(&["/greet/{name}"]);

        let m = matched(router.resolve(Method::Get, "/greet/Sam%20Smith"));
        assert_eq!(m.param("name"), Some("Sam Smith"));

        let m = matched(router.resolve(Method::Get, "/greet/a%2Fb"));
        assert_eq!(m.template(), "/greet/{name}");
        assert_eq!(m.param("name"), Some("a/b"));
    }

    #[test]
    fn empty_segment_does_not_fill_a_placeholder() {
        let router = router(&["/greet/{name}"]);
        assert_eq!(router.resolve(Method::Get, "/greet/"), Resolution::NotFound);
    }

    #[test]
    fn routes_are_per_method() {
        let router = router(&["/"]);
        assert_eq!(router.resolve(Method::Post, "/"), Resolution::NotFound);
    }

    #[test]
    fn literal_segment_beats_placeholder_in_any_order() {
        for templates in [["/greet/{name}", "/greet/admin"], ["/greet/admin", "/greet/{name}"]] {
            let router = router(&templates);
            assert_eq!(matched(router.resolve(Method::Get, "/greet/admin")).template(), "/greet/admin");
            assert_eq!(matched(router.resolve(Method::Get, "/greet/bob")).template(), "/greet/{name}");
        }
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for template in [
            "greet",
            "/greet/{name",
            "/greet/name}",
            "/greet/{}",
            "/greet/{*rest}",
            "/greet/x{name}",
            "/greet/{a}{b}",
            "/greet/{a{b}}",
            "/{a}/{a}",
        ] {
            let err = Router::new().get(template, noop).err();
            assert!(
                matches!(err, Some(Error::InvalidRoute { .. })),
                "{template} should be rejected, got {err:?}",
            );
        }
    }

    #[test]
    fn duplicate_template_is_rejected() {
        let err = Router::new()
            .get("/greet/{name}", noop)
            .and_then(|r| r.get("/greet/{name}", noop))
            .err();
        assert!(matches!(err, Some(Error::DuplicateRoute { method: Method::Get, .. })));
    }

    #[test]
    fn same_template_on_another_method_is_fine() {
        let router = Router::new()
            .get("/greet/{name}", noop)
            .and_then(|r| r.route(Method::Post, "/greet/{name}", noop))
            .unwrap();
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn renamed_placeholder_conflicts() {
        let err = Router::new()
            .get("/greet/{name}", noop)
            .and_then(|r| r.get("/greet/{who}", noop))
            .err();
        assert!(matches!(err, Some(Error::InvalidRoute { .. })));
    }
}
