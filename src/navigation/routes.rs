use std::collections::HashMap;

use super::navigator::{DEFAULT_ROUTE, ENTRY_ROUTE};

const TITLE_SUFFIX: &str = "KGE-Gen";

/// Access requirements and presentation data of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    /// Requirements applied to paths no route declares
    pub const UNMATCHED: RouteMeta = RouteMeta {
        title: None,
        requires_auth: true,
        requires_admin: false,
    };

    pub const fn public(title: &'static str) -> Self {
        Self {
            title: Some(title),
            requires_auth: false,
            requires_admin: false,
        }
    }

    pub const fn authenticated(title: &'static str) -> Self {
        Self {
            title: Some(title),
            requires_auth: true,
            requires_admin: false,
        }
    }

    pub const fn admin(title: &'static str) -> Self {
        Self {
            title: Some(title),
            requires_auth: true,
            requires_admin: true,
        }
    }
}

/// A declared route pattern such as `/review/:id`
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: &'static str,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
}

impl Route {
    pub fn new(pattern: &'static str, meta: RouteMeta) -> Self {
        Self {
            pattern,
            meta,
            redirect: None,
        }
    }

    pub fn redirecting(pattern: &'static str, to: &'static str, meta: RouteMeta) -> Self {
        Self {
            pattern,
            meta,
            redirect: Some(to),
        }
    }

    /// Match `path` against the pattern, capturing `:param` segments.
    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern: Vec<&str> = segments(self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), got.to_string());
                }
                None if expected == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|s| !s.is_empty())
}

/// Outcome of looking a path up in a [`RouteTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub path: String,
    /// Pattern of the matched route, `None` when nothing matched
    pub pattern: Option<&'static str>,
    pub params: HashMap<String, String>,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
}

impl ResolvedRoute {
    pub fn is_entry(&self) -> bool {
        self.pattern == Some(ENTRY_ROUTE)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Browser-style title, `"<title> - KGE-Gen"`
    pub fn document_title(&self) -> Option<String> {
        self.meta
            .title
            .map(|title| format!("{} - {}", title, TITLE_SUFFIX))
    }
}

/// Ordered set of declared routes; the first match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Routes of the dataset generation console
    pub fn console() -> Self {
        Self::new(vec![
            Route::new(ENTRY_ROUTE, RouteMeta::public("Login")),
            Route::redirecting(
                "/",
                DEFAULT_ROUTE,
                RouteMeta {
                    title: None,
                    requires_auth: true,
                    requires_admin: false,
                },
            ),
            Route::new("/tasks", RouteMeta::authenticated("Tasks")),
            Route::new("/create", RouteMeta::admin("New Task")),
            Route::new("/config", RouteMeta::admin("Configuration")),
            Route::new("/task/:id", RouteMeta::authenticated("Task Detail")),
            Route::new("/review/:id", RouteMeta::authenticated("Data Review")),
            Route::new(
                "/review/:id/detail/:itemId",
                RouteMeta::authenticated("Review Detail"),
            ),
            Route::new("/users", RouteMeta::admin("User Management")),
        ])
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Look `path` up; unmatched paths get [`RouteMeta::UNMATCHED`].
    pub fn resolve(&self, path: &str) -> ResolvedRoute {
        for route in &self.routes {
            if let Some(params) = route.matches(path) {
                return ResolvedRoute {
                    path: path.to_string(),
                    pattern: Some(route.pattern),
                    params,
                    meta: route.meta,
                    redirect: route.redirect,
                };
            }
        }

        ResolvedRoute {
            path: path.to_string(),
            pattern: None,
            params: HashMap::new(),
            meta: RouteMeta::UNMATCHED,
            redirect: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolve_static_routes() {
        let table = RouteTable::console();

        let login = table.resolve("/login");
        assert!(login.is_entry());
        assert!(!login.meta.requires_auth);

        let users = table.resolve("/users");
        assert!(users.meta.requires_auth);
        assert!(users.meta.requires_admin);

        let tasks = table.resolve("/tasks/");
        assert_eq!(tasks.pattern, Some("/tasks"));
        assert!(!tasks.meta.requires_admin);
    }

    #[test]
    fn test_resolve_params() {
        let table = RouteTable::console();

        let detail = table.resolve("/review/t-42/detail/item-7");
        assert_eq!(detail.pattern, Some("/review/:id/detail/:itemId"));
        assert_eq!(detail.param("id"), Some("t-42"));
        assert_eq!(detail.param("itemId"), Some("item-7"));

        let review = table.resolve("/review/t-42?status=pending");
        assert_eq!(review.pattern, Some("/review/:id"));
        assert_eq!(review.param("id"), Some("t-42"));
    }

    #[test]
    fn test_root_redirects_to_default() {
        let root = RouteTable::console().resolve("/");
        assert_eq!(root.redirect, Some(DEFAULT_ROUTE));
    }

    #[test]
    fn test_unmatched_fails_closed() {
        let unknown = RouteTable::console().resolve("/does/not/exist");
        assert_eq!(unknown.pattern, None);
        assert_eq!(unknown.meta, RouteMeta::UNMATCHED);
        assert!(unknown.meta.requires_auth);
    }

    #[test]
    fn test_document_title() {
        let table = RouteTable::console();
        assert_eq!(
            table.resolve("/task/abc").document_title().as_deref(),
            Some("Task Detail - KGE-Gen")
        );
        assert_eq!(table.resolve("/").document_title(), None);
    }
}
