//! Merge a user's role grants into one effective privilege view.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{FeatureModule, Permission, PrivilegeLevel, Role, RoleAssignment};

/// Label used when a user holds no role at all.
pub const DEFAULT_ROLE_DISPLAY_NAME: &str = "User";

/// Effective privileges derived from roles and assignments.
///
/// Recomputed on demand, never persisted.
///
/// # Invariants
/// - `highest_privilege_level` is the minimum level of `effective_roles`,
///   absent when there are none.
/// - `all_permissions` / `all_modules` are unions over `effective_roles`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedPrivileges {
    pub effective_roles: Vec<Role>,
    pub effective_assignments: Vec<RoleAssignment>,
    pub highest_privilege_level: Option<PrivilegeLevel>,
    pub all_permissions: BTreeSet<Permission>,
    pub all_modules: BTreeSet<FeatureModule>,
}

impl ResolvedPrivileges {
    pub fn is_empty(&self) -> bool {
        self.effective_roles.is_empty()
    }

    pub fn primary_role_display_name(&self) -> &str {
        primary_role_display_name(&self.effective_roles)
    }

    pub fn privilege_name(&self) -> &'static str {
        crate::privilege_name(self.highest_privilege_level)
    }
}

/// Resolve `roles` and `assignments` into [`ResolvedPrivileges`] as of `now`.
///
/// A role is effective when some assignment referencing it is active and
/// unexpired and the role itself is active. Input order of roles is kept.
///
/// `effective_assignments` is the looser set of all active assignments,
/// regardless of expiry or role state.
pub fn aggregate(
    roles: &[Role],
    assignments: &[RoleAssignment],
    now: DateTime<Utc>,
) -> ResolvedPrivileges {
    let effective_roles: Vec<Role> = roles
        .iter()
        .filter(|role| assignments.iter().any(|a| a.grants(role, now)))
        .cloned()
        .collect();

    let effective_assignments = assignments
        .iter()
        .filter(|a| a.is_active)
        .cloned()
        .collect();

    let highest_privilege_level = effective_roles.iter().map(|r| r.privilege_level).min();

    let all_permissions = effective_roles
        .iter()
        .flat_map(|r| r.permissions.iter().cloned())
        .collect();

    let all_modules = effective_roles
        .iter()
        .flat_map(|r| r.modules.iter().cloned())
        .collect();

    ResolvedPrivileges {
        effective_roles,
        effective_assignments,
        highest_privilege_level,
        all_permissions,
        all_modules,
    }
}

pub fn has_permission(privileges: &ResolvedPrivileges, permission: &str) -> bool {
    privileges.all_permissions.contains(permission)
}

/// Any of `permissions` is held. An empty list is never satisfied.
pub fn has_any_permission<S: AsRef<str>>(privileges: &ResolvedPrivileges, permissions: &[S]) -> bool {
    permissions
        .iter()
        .any(|p| has_permission(privileges, p.as_ref()))
}

/// All of `permissions` are held. An empty list is never satisfied.
pub fn has_all_permissions<S: AsRef<str>>(privileges: &ResolvedPrivileges, permissions: &[S]) -> bool {
    !permissions.is_empty()
        && permissions
            .iter()
            .all(|p| has_permission(privileges, p.as_ref()))
}

pub fn has_module(privileges: &ResolvedPrivileges, module: &str) -> bool {
    privileges.all_modules.contains(module)
}

/// Any of `modules` is accessible. An empty list is never satisfied.
pub fn has_any_module<S: AsRef<str>>(privileges: &ResolvedPrivileges, modules: &[S]) -> bool {
    modules.iter().any(|m| has_module(privileges, m.as_ref()))
}

/// Display name of the most privileged role; the first one wins on ties.
pub fn primary_role_display_name(roles: &[Role]) -> &str {
    roles
        .iter()
        .min_by_key(|r| r.privilege_level)
        .map_or(DEFAULT_ROLE_DISPLAY_NAME, |r| r.display_name.as_str())
}
