//! Route table, navigator and the access-control guard.

mod guard;
mod navigator;
mod routes;

pub use guard::{GuardDecision, NavigationGuard};
pub use navigator::{Navigator, DEFAULT_ROUTE, ENTRY_ROUTE};
pub use routes::{ResolvedRoute, Route, RouteMeta, RouteTable};
