use crate::application::models::user::Role;
use crate::session::state::SessionState;
use tracing::debug;

pub const LOGIN_ROUTE: &str = "/login";

/// Access requirement attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRule {
    /// Reachable without a session.
    Public,
    /// Any authenticated user.
    Authenticated,
    /// A single role, fixed at route definition time.
    Role(Role),
    /// Routes whose first path segment is a role (`/barber/schedule`).
    /// The segment must match the session's role; mismatches redirect to
    /// the canonical path for the user's real role.
    RoleScoped,
}

/// What the router should do with a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    NotFound,
    RedirectTo(String),
}

/// Decides whether the current session may see `path` under `rule`.
pub fn evaluate(rule: RouteRule, path: &str, state: &SessionState) -> RouteDecision {
    if rule == RouteRule::Public {
        return RouteDecision::Allow;
    }

    let Some(role) = state.role().filter(|_| state.is_authenticated) else {
        debug!("Unauthenticated access to {}, redirecting to login", path);
        return RouteDecision::RedirectToLogin;
    };

    match rule {
        RouteRule::Public => RouteDecision::Allow,
        RouteRule::Authenticated => RouteDecision::Allow,
        RouteRule::Role(required) => {
            if role == required {
                RouteDecision::Allow
            } else {
                debug!("{} route denied for {} user", required, role);
                RouteDecision::NotFound
            }
        }
        RouteRule::RoleScoped => {
            let segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
            match Role::from_segment(segment) {
                Some(routed) if routed == role => RouteDecision::Allow,
                Some(_) => {
                    let canonical = canonical_path(path, segment, role);
                    debug!("Role segment mismatch on {}, redirecting to {}", path, canonical);
                    RouteDecision::RedirectTo(canonical)
                }
                None => RouteDecision::NotFound,
            }
        }
    }
}

/// Rewrites the leading role segment of `path` to the session's role.
fn canonical_path(path: &str, segment: &str, role: Role) -> String {
    let rest = path
        .trim_start_matches('/')
        .strip_prefix(segment)
        .unwrap_or("");
    format!("/{}{}", role.url_segment(), rest)
}
