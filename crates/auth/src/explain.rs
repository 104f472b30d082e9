//! Access explanations (audit trail).
//!
//! Answers "why can / can't this user see that?" for support tooling and
//! audit logs without changing any decision.

use serde::Serialize;

use crate::{PrivilegeLevel, ResolvedPrivileges, has_permission};

/// Detailed explanation of a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    /// Role names (of effective roles) that carry the permission.
    pub granting_roles: Vec<String>,
    pub effective_roles: Vec<String>,
    pub effective_permissions: Vec<String>,
    pub highest_privilege_level: Option<PrivilegeLevel>,
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// The user holds no effective role at all.
    NoEffectiveRoles,
    /// Roles are held but none carries the permission.
    MissingPermission,
}

/// Explain whether `privileges` include `required`.
pub fn explain_permission(privileges: &ResolvedPrivileges, required: &str) -> AccessExplanation {
    let effective_roles: Vec<String> = privileges
        .effective_roles
        .iter()
        .map(|r| r.role_name.clone())
        .collect();
    let effective_permissions: Vec<String> = privileges
        .all_permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    let granting_roles: Vec<String> = privileges
        .effective_roles
        .iter()
        .filter(|r| r.permissions.contains(required))
        .map(|r| r.role_name.clone())
        .collect();

    let granted = has_permission(privileges, required);

    let (reason, denial_reason) = if granted {
        (
            format!("permission '{required}' granted by role(s) {granting_roles:?}"),
            None,
        )
    } else if privileges.is_empty() {
        (
            "user holds no active, unexpired role".to_string(),
            Some(DenialReason {
                kind: DenialKind::NoEffectiveRoles,
                message: "no effective role assignments".to_string(),
                suggestions: vec![
                    "check that the role assignment is active and not expired".to_string(),
                    "check that the assigned role itself is active".to_string(),
                ],
            }),
        )
    } else {
        (
            format!("permission '{required}' is not carried by any effective role"),
            Some(DenialReason {
                kind: DenialKind::MissingPermission,
                message: format!("missing required permission: '{required}'"),
                suggestions: vec![
                    format!("assign a role that grants '{required}'"),
                    format!("add '{required}' to one of {effective_roles:?}"),
                ],
            }),
        )
    };

    AccessExplanation {
        required_permission: required.to_string(),
        granted,
        reason,
        granting_roles,
        effective_roles,
        effective_permissions,
        highest_privilege_level: privileges.highest_privilege_level,
        denial_reason,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use portalguard_core::{AssignmentId, RoleId, UserId};

    use super::*;
    use crate::{Permission, Role, RoleAssignment, aggregate};

    fn granted_role(name: &str, perms: &[&'static str]) -> (Role, RoleAssignment) {
        let role = Role {
            id: RoleId::new(),
            role_name: name.to_string(),
            display_name: name.to_uppercase(),
            privilege_level: PrivilegeLevel::new(50),
            permissions: perms.iter().map(|p| Permission::new(*p)).collect(),
            modules: Default::default(),
            is_active: true,
        };
        let assignment = RoleAssignment {
            id: AssignmentId::new(),
            user_id: UserId::new(),
            platform_role_id: role.id,
            is_active: true,
            expires_at: None,
        };
        (role, assignment)
    }

    #[test]
    fn granted_lists_granting_roles() {
        let (manager, a1) = granted_role("manager", &["reports.read", "staff.read"]);
        let (clerk, a2) = granted_role("clerk", &["reports.read"]);
        let resolved = aggregate(&[manager, clerk], &[a1, a2], Utc::now());

        let explanation = explain_permission(&resolved, "reports.read");

        assert!(explanation.granted);
        assert_eq!(explanation.granting_roles, vec!["manager", "clerk"]);
        assert!(explanation.denial_reason.is_none());
    }

    #[test]
    fn denial_distinguishes_no_roles_from_missing_permission() {
        let empty = explain_permission(&ResolvedPrivileges::default(), "x");
        assert_eq!(empty.denial_reason.unwrap().kind, DenialKind::NoEffectiveRoles);

        let (clerk, a) = granted_role("clerk", &["reports.read"]);
        let resolved = aggregate(&[clerk], &[a], Utc::now());
        let missing = explain_permission(&resolved, "billing.write");
        assert!(!missing.granted);
        assert_eq!(missing.denial_reason.unwrap().kind, DenialKind::MissingPermission);
        assert_eq!(missing.effective_permissions, vec!["reports.read"]);
    }
}
