//! User and role models
//!
//! Authentication itself lives outside this system; the stock engine only
//! needs to know who acted and which roles receive alert notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Supervisor,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Supervisor => "supervisor",
            Role::Worker => "worker",
        }
    }

    /// Elevated roles receive operational alerts (low stock and the like)
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// The elevated roles, for recipient queries
    pub fn elevated() -> [Role; 2] {
        [Role::Admin, Role::Manager]
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "supervisor" => Ok(Role::Supervisor),
            "worker" => Ok(Role::Worker),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_and_manager_are_elevated() {
        assert!(Role::Admin.is_elevated());
        assert!(Role::Manager.is_elevated());
        assert!(!Role::Supervisor.is_elevated());
        assert!(!Role::Worker.is_elevated());
    }

    #[test]
    fn elevated_list_agrees_with_predicate() {
        let elevated = Role::elevated();
        for role in [Role::Admin, Role::Manager, Role::Supervisor, Role::Worker] {
            assert_eq!(elevated.contains(&role), role.is_elevated());
        }
    }
}
