//! Route permission table.
//!
//! Every (method, route template) the router serves is listed here with the
//! permission it requires. The access middleware looks requests up by the
//! router's matched template, so routes and requirements cannot drift apart
//! silently: the path constants below are the ones `routes()` registers.

use axum::http::Method;

pub const HEALTH: &str = "/health";
pub const DRINKS: &str = "/drinks";
pub const DRINKS_DETAIL: &str = "/drinks-detail";
pub const DRINK: &str = "/drinks/{drink_id}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Requires(&'static str),
}

#[derive(Debug)]
pub struct RoutePermission {
    pub method: Method,
    pub path: &'static str,
    pub access: Access,
}

pub static ROUTE_PERMISSIONS: [RoutePermission; 6] = [
    RoutePermission {
        method: Method::GET,
        path: HEALTH,
        access: Access::Public,
    },
    RoutePermission {
        method: Method::GET,
        path: DRINKS,
        access: Access::Public,
    },
    RoutePermission {
        method: Method::GET,
        path: DRINKS_DETAIL,
        access: Access::Requires("get:drinks-detail"),
    },
    RoutePermission {
        method: Method::POST,
        path: DRINKS,
        access: Access::Requires("post:drinks"),
    },
    RoutePermission {
        method: Method::PATCH,
        path: DRINK,
        access: Access::Requires("patch:drinks"),
    },
    RoutePermission {
        method: Method::DELETE,
        path: DRINK,
        access: Access::Requires("delete:drinks"),
    },
];

/// Requirement for `method` on the matched route template.
///
/// `HEAD` shares the `GET` entry. `None` means the pair is not served.
pub fn lookup(method: &Method, path: &str) -> Option<Access> {
    let method = if method == Method::HEAD {
        &Method::GET
    } else {
        method
    };

    ROUTE_PERMISSIONS
        .iter()
        .find(|r| r.method == *method && r.path == path)
        .map(|r| r.access)
}
