use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The caller's role, as asserted by the upstream auth gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// Parses the gateway's `x-user-role` header value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// The authenticated caller, injected as a request extension by
/// `middleware_layer::auth::require_auth`.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The calling user's ID.
    pub user_id: Uuid,
    /// The calling user's role.
    pub role: Role,
}
