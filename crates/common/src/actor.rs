//! Caller identity, as established by the upstream auth gateway.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Role attached to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }

    /// Parses a role from its lowercase wire form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated caller of an operation.
///
/// Authentication itself happens upstream; services only consume the
/// resulting identity and role for authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Sellers and admins may manage catalog entries.
    pub fn can_manage_products(&self) -> bool {
        matches!(self.role, Role::Seller | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trip() {
        for role in [Role::Buyer, Role::Seller, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn admin_predicates() {
        let admin = Actor::new(UserId::new(), Role::Admin);
        let buyer = Actor::new(UserId::new(), Role::Buyer);
        assert!(admin.is_admin());
        assert!(admin.can_manage_products());
        assert!(!buyer.is_admin());
        assert!(!buyer.can_manage_products());
    }
}
