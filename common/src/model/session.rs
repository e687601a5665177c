use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    /// The landing page of a signed-in user with this role.
    pub fn home(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Student => "/user/dashboard",
        }
    }
}

/// Returned by a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub token: String,
    pub role: Role,
    pub home: String,
}
