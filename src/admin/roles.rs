/// Participant roles
use serde::{Deserialize, Serialize};

/// Role levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can respond and see the roster
    Member,
    /// Can also see aggregate counts and reset every response
    Admin,
}

impl Role {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            Role::Admin
        } else {
            Role::Member
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }

    /// Check if this role can perform actions requiring another role
    pub fn can_act_as(&self, required: Role) -> bool {
        self >= &required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(Role::Admin > Role::Member);
        assert!(Role::Admin.can_act_as(Role::Member));
        assert!(Role::Admin.can_act_as(Role::Admin));
        assert!(!Role::Member.can_act_as(Role::Admin));
    }

    #[test]
    fn test_from_admin_flag() {
        assert!(Role::from_admin_flag(true).is_admin());
        assert!(!Role::from_admin_flag(false).is_admin());
    }
}
