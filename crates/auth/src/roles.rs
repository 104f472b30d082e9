use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portalguard_core::{AssignmentId, RoleId, UserId};

use crate::{FeatureModule, Permission, PrivilegeLevel};

/// A platform role as published by the role-management system.
///
/// Read-only from this crate's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    #[serde(alias = "roleName")]
    pub role_name: String,
    #[serde(alias = "displayName")]
    pub display_name: String,
    #[serde(alias = "privilegeLevel")]
    pub privilege_level: PrivilegeLevel,
    #[serde(default)]
    pub permissions: BTreeSet<Permission>,
    #[serde(default)]
    pub modules: BTreeSet<FeatureModule>,
    #[serde(alias = "isActive")]
    pub is_active: bool,
}

/// Links a user to a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: AssignmentId,
    #[serde(alias = "userId")]
    pub user_id: UserId,
    #[serde(alias = "platformRoleId")]
    pub platform_role_id: RoleId,
    #[serde(alias = "isActive")]
    pub is_active: bool,
    #[serde(default, alias = "expiresAt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl RoleAssignment {
    /// An assignment that expires exactly at `now` is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Active and unexpired, irrespective of the referenced role.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// This assignment makes `role` effective at `now`.
    pub fn grants(&self, role: &Role, now: DateTime<Utc>) -> bool {
        self.platform_role_id == role.id && role.is_active && self.is_live_at(now)
    }
}
