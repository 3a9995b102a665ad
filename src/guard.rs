use std::fmt;

use crate::session::SessionStore;
use crate::types::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }

    /// Route table. Unknown paths fall through to a redirect to login.
    pub fn resolve(path: &str) -> Navigation<Route> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/login" => Navigation::Render(Route::Login),
            "/register" => Navigation::Render(Route::Register),
            "/dashboard" => Navigation::Render(Route::Dashboard),
            _ => Navigation::Redirect(Route::Login),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation<V> {
    Render(V),
    Redirect(Route),
}

impl<V> Navigation<V> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }

    pub fn into_view(self) -> Option<V> {
        match self {
            Navigation::Render(view) => Some(view),
            Navigation::Redirect(_) => None,
        }
    }
}

/// Receives redirects issued outside of a render pass, e.g. a forced logout
/// after the backend rejects the token.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Gate in front of a protected view. Holds no state of its own; every call
/// re-reads the session.
pub struct AccessGuard<'a> {
    session: &'a SessionStore,
}

impl<'a> AccessGuard<'a> {
    pub fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    /// Build the view only when a user is logged in.
    pub fn protect<V>(&self, view: impl FnOnce(User) -> V) -> Navigation<V> {
        match self.session.current_user() {
            Some(user) => Navigation::Render(view(user)),
            None => {
                tracing::debug!("no session, redirecting to {}", Route::Login);
                Navigation::Redirect(Route::Login)
            }
        }
    }

    /// Resolve `path` and apply the gate to protected routes.
    pub fn navigate(&self, path: &str) -> Navigation<Route> {
        match Route::resolve(path) {
            Navigation::Render(route) if route.is_protected() => self.protect(|_| route),
            other => other,
        }
    }
}
