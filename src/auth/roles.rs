// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account roles and per-route role policies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Privilege tier assigned to an account.
///
/// The set is closed: an account always carries exactly one of these.
/// `Admin` is the least privileged value and the default on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office operator
    Admin,
    /// Operator allowed to manage other operators
    Superadmin,
}

impl Role {
    /// Every role, in ascending privilege order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::Superadmin];

    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    /// Stable lowercase name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Whether an account with this role may modify or delete an account
    /// holding `target`.
    ///
    /// Superadmins manage everyone; admins only manage admins. Route
    /// policies stay pure membership checks, this applies to the record
    /// being acted on.
    pub fn can_manage(&self, target: Role) -> bool {
        match (self, target) {
            (Role::Superadmin, _) => true,
            (Role::Admin, Role::Admin) => true,
            (Role::Admin, Role::Superadmin) => false,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Admin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The roles permitted to invoke an operation.
///
/// A policy is a finite set over [`Role`]; it allows an account iff the
/// account's role is a member. Membership is the only rule: there is no
/// implied hierarchy between roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePolicy {
    admin: bool,
    superadmin: bool,
}

impl RolePolicy {
    /// Any back-office account.
    pub const ANY_ADMIN: RolePolicy = RolePolicy {
        admin: true,
        superadmin: true,
    };

    /// Superadmins only.
    pub const SUPERADMIN_ONLY: RolePolicy = RolePolicy {
        admin: false,
        superadmin: true,
    };

    /// Build a policy from an explicit list of roles.
    pub fn new(roles: &[Role]) -> Self {
        let mut policy = RolePolicy {
            admin: false,
            superadmin: false,
        };
        for role in roles {
            match role {
                Role::Admin => policy.admin = true,
                Role::Superadmin => policy.superadmin = true,
            }
        }
        policy
    }

    /// Whether `role` is a member of this policy.
    pub fn allows(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.admin,
            Role::Superadmin => self.superadmin,
        }
    }

    /// The roles this policy admits.
    pub fn roles(&self) -> Vec<Role> {
        Role::ALL.into_iter().filter(|r| self.allows(*r)).collect()
    }
}

impl std::fmt::Display for RolePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.roles().iter().map(Role::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("SuperAdmin"), Some(Role::Superadmin));
        assert_eq!(Role::from_str("root"), None);
        assert_eq!(Role::from_str(""), None);
    }

    #[test]
    fn default_role_is_least_privileged() {
        assert_eq!(Role::default(), Role::Admin);
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), r#""superadmin""#);
        let parsed: Role = serde_json::from_str(r#""admin""#).unwrap();
        assert_eq!(parsed, Role::Admin);
        assert!(serde_json::from_str::<Role>(r#""owner""#).is_err());
    }

    #[test]
    fn policy_membership_is_exhaustive_over_roles() {
        let cases = [
            (RolePolicy::ANY_ADMIN, Role::Admin, true),
            (RolePolicy::ANY_ADMIN, Role::Superadmin, true),
            (RolePolicy::SUPERADMIN_ONLY, Role::Admin, false),
            (RolePolicy::SUPERADMIN_ONLY, Role::Superadmin, true),
            (RolePolicy::new(&[Role::Admin]), Role::Admin, true),
            (RolePolicy::new(&[Role::Admin]), Role::Superadmin, false),
            (RolePolicy::new(&[]), Role::Admin, false),
            (RolePolicy::new(&[]), Role::Superadmin, false),
        ];
        for (policy, role, expected) in cases {
            assert_eq!(policy.allows(role), expected, "{policy} vs {role}");
        }
    }

    #[test]
    fn admins_cannot_manage_superadmins() {
        assert!(Role::Superadmin.can_manage(Role::Superadmin));
        assert!(Role::Superadmin.can_manage(Role::Admin));
        assert!(Role::Admin.can_manage(Role::Admin));
        assert!(!Role::Admin.can_manage(Role::Superadmin));
    }

    #[test]
    fn policy_new_matches_constants() {
        assert_eq!(RolePolicy::new(&[Role::Admin, Role::Superadmin]), RolePolicy::ANY_ADMIN);
        assert_eq!(RolePolicy::new(&[Role::Superadmin]), RolePolicy::SUPERADMIN_ONLY);
        assert_eq!(RolePolicy::ANY_ADMIN.to_string(), "{admin, superadmin}");
    }
}
