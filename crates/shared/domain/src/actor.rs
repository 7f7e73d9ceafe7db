//! Caller identity and the visibility rule derived from it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ROLE_ADMIN, ROLE_USER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        UserRole::from(s.as_str())
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// The identity on whose behalf an operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub roles: Vec<UserRole>,
}

impl Actor {
    pub fn new(id: Uuid, roles: Vec<UserRole>) -> Self {
        Self { id, roles }
    }

    /// Build an actor from raw role names; unknown names count as `user`.
    pub fn with_role_names<I, S>(id: Uuid, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let roles = roles.into_iter().map(|r| UserRole::from(r.as_ref())).collect();
        Self { id, roles }
    }

    /// Check if the actor holds the admin capability
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(UserRole::is_admin)
    }

    /// Soft-delete states this actor may observe.
    pub fn visibility(&self) -> Visibility {
        if self.is_admin() {
            Visibility::IncludeDeleted
        } else {
            Visibility::ActiveOnly
        }
    }
}

/// Which soft-delete states a query may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only records whose `deleted_at` is null
    ActiveOnly,
    /// Active and soft-deleted records alike
    IncludeDeleted,
}

impl Visibility {
    /// Whether a record in the given delete state passes this filter.
    pub fn admits(&self, deleted: bool) -> bool {
        match self {
            Visibility::ActiveOnly => !deleted,
            Visibility::IncludeDeleted => true,
        }
    }
}
