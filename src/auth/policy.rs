/*!
 * Declarative access policy.
 *
 * Every guarded route names a permission ("resource:action"); this table maps
 * each permission to the roles allowed to use it. Route handlers never check
 * roles themselves.
 */

use lazy_static::lazy_static;
use std::collections::HashMap;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CLERK: &str = "clerk";
pub const ROLE_LOW: &str = "low";

/// All roles, in descending order of privilege.
pub const ALL_ROLES: [&str; 3] = [ROLE_ADMIN, ROLE_CLERK, ROLE_LOW];

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    pub const MANAGE: &'static str = "manage";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const MEMOS: &'static str = "memos";
    pub const LRS: &'static str = "lrs";
    pub const CASH_MEMOS: &'static str = "cashmemos";
    pub const DELIVERY_PERSONS: &'static str = "deliverypersons";
    pub const SUGGESTIONS: &'static str = "suggestions";
    pub const YEARS: &'static str = "years";
    pub const REPORTS: &'static str = "reports";
    pub const AUDIT_LOG: &'static str = "auditlog";
    pub const USERS: &'static str = "users";
    pub const APP_KEYS: &'static str = "appkeys";
    pub const DASHBOARD: &'static str = "dashboard";
}

/// Permission string constants for compile-time safety
pub mod perm {
    pub const MEMOS_READ: &str = "memos:read";
    pub const MEMOS_CREATE: &str = "memos:create";
    pub const MEMOS_UPDATE: &str = "memos:update";
    pub const MEMOS_DELETE: &str = "memos:delete";

    pub const LRS_READ: &str = "lrs:read";
    pub const LRS_CREATE: &str = "lrs:create";
    pub const LRS_UPDATE: &str = "lrs:update";
    pub const LRS_DELETE: &str = "lrs:delete";
    pub const LRS_DELIVER: &str = "lrs:deliver";

    pub const CASH_MEMOS_READ: &str = "cashmemos:read";
    pub const CASH_MEMOS_CREATE: &str = "cashmemos:create";
    pub const CASH_MEMOS_UPDATE: &str = "cashmemos:update";
    pub const CASH_MEMOS_DELETE: &str = "cashmemos:delete";

    pub const DELIVERY_PERSONS_READ: &str = "deliverypersons:read";
    pub const DELIVERY_PERSONS_CREATE: &str = "deliverypersons:create";
    pub const DELIVERY_PERSONS_UPDATE: &str = "deliverypersons:update";
    pub const DELIVERY_PERSONS_DELETE: &str = "deliverypersons:delete";

    pub const SUGGESTIONS_READ: &str = "suggestions:read";
    pub const SUGGESTIONS_CREATE: &str = "suggestions:create";

    pub const YEARS_READ: &str = "years:read";
    pub const YEARS_MANAGE: &str = "years:manage";

    pub const REPORTS_READ: &str = "reports:read";
    pub const AUDIT_LOG_READ: &str = "auditlog:read";
    pub const USERS_MANAGE: &str = "users:manage";

    pub const APP_KEYS_MANAGE: &str = "appkeys:manage";
    pub const APP_KEYS_VALIDATE: &str = "appkeys:validate";
    pub const APP_KEYS_STATUS: &str = "appkeys:status";

    pub const DASHBOARD_READ: &str = "dashboard:read";
}

lazy_static! {
    /// Permission -> allowed roles. A missing entry denies everyone.
    static ref POLICIES: HashMap<&'static str, Vec<&'static str>> = {
        let mut table: HashMap<&'static str, Vec<&'static str>> = HashMap::new();

        let everyone = || ALL_ROLES.to_vec();
        let staff = || vec![ROLE_ADMIN, ROLE_CLERK];
        let admin_only = || vec![ROLE_ADMIN];

        table.insert(perm::MEMOS_READ, everyone());
        table.insert(perm::MEMOS_CREATE, staff());
        table.insert(perm::MEMOS_UPDATE, staff());
        table.insert(perm::MEMOS_DELETE, admin_only());

        table.insert(perm::LRS_READ, everyone());
        table.insert(perm::LRS_CREATE, staff());
        table.insert(perm::LRS_UPDATE, staff());
        table.insert(perm::LRS_DELETE, admin_only());
        table.insert(perm::LRS_DELIVER, staff());

        table.insert(perm::CASH_MEMOS_READ, everyone());
        table.insert(perm::CASH_MEMOS_CREATE, staff());
        table.insert(perm::CASH_MEMOS_UPDATE, staff());
        table.insert(perm::CASH_MEMOS_DELETE, admin_only());

        table.insert(perm::DELIVERY_PERSONS_READ, everyone());
        table.insert(perm::DELIVERY_PERSONS_CREATE, staff());
        table.insert(perm::DELIVERY_PERSONS_UPDATE, staff());
        table.insert(perm::DELIVERY_PERSONS_DELETE, admin_only());

        table.insert(perm::SUGGESTIONS_READ, everyone());
        table.insert(perm::SUGGESTIONS_CREATE, staff());

        table.insert(perm::YEARS_READ, everyone());
        table.insert(perm::YEARS_MANAGE, admin_only());

        table.insert(perm::REPORTS_READ, staff());
        table.insert(perm::AUDIT_LOG_READ, admin_only());
        table.insert(perm::USERS_MANAGE, admin_only());

        table.insert(perm::APP_KEYS_MANAGE, admin_only());
        table.insert(perm::APP_KEYS_VALIDATE, everyone());
        table.insert(perm::APP_KEYS_STATUS, everyone());

        table.insert(perm::DASHBOARD_READ, everyone());

        table
    };
}

/// Checks a role against the policy table.
pub fn role_allows(role: &str, permission: &str) -> bool {
    POLICIES
        .get(permission)
        .map(|roles| roles.iter().any(|r| *r == role))
        .unwrap_or(false)
}

/// Whether the string names a known role.
pub fn is_known_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_do_everything_in_the_table() {
        for permission in POLICIES.keys() {
            assert!(
                role_allows(ROLE_ADMIN, permission),
                "admin denied {permission}"
            );
        }
    }

    #[test]
    fn clerk_cannot_delete_or_administer() {
        assert!(role_allows(ROLE_CLERK, perm::MEMOS_CREATE));
        assert!(role_allows(ROLE_CLERK, perm::LRS_DELIVER));
        assert!(role_allows(ROLE_CLERK, perm::REPORTS_READ));
        assert!(!role_allows(ROLE_CLERK, perm::MEMOS_DELETE));
        assert!(!role_allows(ROLE_CLERK, perm::LRS_DELETE));
        assert!(!role_allows(ROLE_CLERK, perm::CASH_MEMOS_DELETE));
        assert!(!role_allows(ROLE_CLERK, perm::USERS_MANAGE));
        assert!(!role_allows(ROLE_CLERK, perm::AUDIT_LOG_READ));
        assert!(!role_allows(ROLE_CLERK, perm::APP_KEYS_MANAGE));
    }

    #[test]
    fn low_role_is_read_only() {
        assert!(role_allows(ROLE_LOW, perm::MEMOS_READ));
        assert!(role_allows(ROLE_LOW, perm::LRS_READ));
        assert!(role_allows(ROLE_LOW, perm::DASHBOARD_READ));
        assert!(!role_allows(ROLE_LOW, perm::MEMOS_CREATE));
        assert!(!role_allows(ROLE_LOW, perm::LRS_UPDATE));
        assert!(!role_allows(ROLE_LOW, perm::REPORTS_READ));
        assert!(!role_allows(ROLE_LOW, perm::SUGGESTIONS_CREATE));
    }

    #[test]
    fn unknown_permission_denies_everyone() {
        assert!(!role_allows(ROLE_ADMIN, "memos:explode"));
        assert!(!role_allows("superuser", perm::MEMOS_READ));
    }
}
