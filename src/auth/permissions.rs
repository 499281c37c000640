//! Which routes need the admin key

use hyper::Method;
use std::fmt;

/// Access required to call a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum AccessLevel {
    /// Open to every client
    #[default]
    Public,
    /// Catalog management and the admin dashboard
    Admin,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Public => write!(f, "PUBLIC"),
            AccessLevel::Admin => write!(f, "ADMIN"),
        }
    }
}

/// Catalog collections managed by admins
const CATALOG_PREFIXES: [&str; 4] = [
    "/api/courses",
    "/api/events",
    "/api/resources",
    "/api/expert-talks",
];

/// Access level required for a request.
///
/// Reads are public. Writes to a catalog and anything under `/api/admin`
/// are admin-only, except event attendee changes which members make
/// themselves.
pub fn required_access(method: &Method, path: &str) -> AccessLevel {
    if path == "/api/admin" || path.starts_with("/api/admin/") {
        return AccessLevel::Admin;
    }

    let writes = matches!(*method, Method::POST | Method::PUT | Method::DELETE);
    if !writes {
        return AccessLevel::Public;
    }

    if path.starts_with("/api/events/") && path.contains("/attendee/") {
        return AccessLevel::Public;
    }

    let catalog = CATALOG_PREFIXES.iter().any(|prefix| {
        path == *prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });

    if catalog {
        AccessLevel::Admin
    } else {
        AccessLevel::Public
    }
}
