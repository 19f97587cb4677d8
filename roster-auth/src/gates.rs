//! Access gates
//!
//! Three call-site adapters that apply permission evaluation to control
//! what is shown or reachable: an inline visibility gate, a wrapping guard
//! for view-producing handlers, and a navigation guard that only checks
//! identity. All three evaluate synchronously against the current session
//! snapshot on every call; none of them memoizes a decision.

use crate::permissions::Permission;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::debug;

/// Where a denied caller should be sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Entry point for unauthenticated callers
    Login,
    /// Destination for authenticated callers lacking a permission
    Unauthorized,
}

/// Outcome of a guarded invocation. Denied access is an outcome, not an
/// error; none of the gates ever returns a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    Denied(Redirect),
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    /// The produced value, if access was granted
    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(value) => Some(value),
            Access::Denied(_) => None,
        }
    }

    /// The redirect destination, if access was denied
    pub fn denied(&self) -> Option<Redirect> {
        match self {
            Access::Granted(_) => None,
            Access::Denied(redirect) => Some(*redirect),
        }
    }
}

/// Inline visibility gate.
///
/// Produces the content block only when the current session holds the
/// required permission; otherwise produces nothing. Used for optional
/// inline affordances such as edit or delete controls.
pub fn when_permitted<T, F>(store: &SessionStore, permission: Permission, content: F) -> Option<T>
where
    F: FnOnce() -> T,
{
    if store.has_permission(permission) {
        Some(content())
    } else {
        debug!("Hiding content requiring {}", permission);
        None
    }
}

/// Navigation guard.
///
/// Identity check only: produces the content for any authenticated
/// session, and redirects anonymous callers to the login entry point.
pub fn require_login<T, F>(store: &SessionStore, content: F) -> Access<T>
where
    F: FnOnce() -> T,
{
    if store.is_authenticated() {
        Access::Granted(content())
    } else {
        debug!("Redirecting unauthenticated caller to login");
        Access::Denied(Redirect::Login)
    }
}

/// Wrapping guard.
///
/// Takes a view-producing handler and a required permission and returns a
/// new handler that re-checks the permission on every invocation, either
/// delegating or redirecting to the unauthorized destination.
pub fn guard_with_permission<I, T, F>(
    store: Arc<SessionStore>,
    permission: Permission,
    handler: F,
) -> impl Fn(I) -> Access<T>
where
    F: Fn(I) -> T,
{
    move |input| {
        if store.has_permission(permission) {
            Access::Granted(handler(input))
        } else {
            debug!("Blocking handler requiring {}", permission);
            Access::Denied(Redirect::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::User;
    use crate::storage::CredentialStorage;
    use std::collections::HashSet;

    fn store_with(permissions: &[Permission]) -> (tempfile::TempDir, Arc<SessionStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(CredentialStorage::new(dir.path()).unwrap());
        if !permissions.is_empty() {
            let user = User {
                id: 1,
                name: "An".to_string(),
                email: None,
                roles: HashSet::new(),
                permissions: permissions.iter().copied().collect(),
            };
            store.set_session(user, "tok".to_string()).unwrap();
        }
        (dir, Arc::new(store))
    }

    #[test]
    fn inline_gate_shows_content_only_with_permission() {
        let (_dir, store) = store_with(&[Permission::EditTag]);

        assert_eq!(
            when_permitted(&store, Permission::EditTag, || "edit button"),
            Some("edit button")
        );
        assert_eq!(
            when_permitted(&store, Permission::DeleteTag, || "delete button"),
            None
        );
    }

    #[test]
    fn inline_gate_hides_everything_for_anonymous() {
        let (_dir, store) = store_with(&[]);
        assert_eq!(when_permitted(&store, Permission::EditTag, || ()), None);
    }

    #[test]
    fn route_guard_checks_identity_not_permissions() {
        let (_dir, store) = store_with(&[]);
        assert_eq!(
            require_login(&store, || "screen").denied(),
            Some(Redirect::Login)
        );

        let (_dir, store) = store_with(&[Permission::EditTag]);
        // any authenticated session passes, whatever its permissions
        assert_eq!(require_login(&store, || "screen").granted(), Some("screen"));
    }

    #[test]
    fn wrapping_guard_delegates_or_redirects() {
        let (_dir, store) = store_with(&[Permission::Admin]);
        let guarded =
            guard_with_permission(store, Permission::DeleteTag, |name: &str| format!("bye {name}"));

        assert_eq!(guarded("An").granted(), Some("bye An".to_string()));
    }

    #[test]
    fn wrapping_guard_re_evaluates_per_invocation() {
        let (_dir, store) = store_with(&[]);
        let guarded = guard_with_permission(store.clone(), Permission::EditTag, |x: i32| x * 2);

        assert_eq!(guarded(2).denied(), Some(Redirect::Unauthorized));

        let user = User {
            id: 2,
            name: "Lee".to_string(),
            email: None,
            roles: HashSet::new(),
            permissions: [Permission::EditTag].into_iter().collect(),
        };
        store.set_session(user, "tok".to_string()).unwrap();

        // same guarded handler, fresh evaluation
        assert_eq!(guarded(2).granted(), Some(4));

        store.clear();
        assert_eq!(guarded(2).denied(), Some(Redirect::Unauthorized));
    }
}
