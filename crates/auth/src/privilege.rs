//! Numeric privilege ranks. A *lower* number means *more* authority.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegeLevel(i32);

impl PrivilegeLevel {
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// True if this level carries at least the authority of `required`.
    pub fn satisfies(&self, required: PrivilegeLevel) -> bool {
        self.0 <= required.0
    }

    pub fn tier(&self) -> PrivilegeTier {
        match self.0 {
            i32::MIN..=10 => PrivilegeTier::PlatformAdmin,
            11..=20 => PrivilegeTier::OrganizationAdmin,
            21..=30 => PrivilegeTier::EntityAdmin,
            31..=40 => PrivilegeTier::Medical,
            41..=60 => PrivilegeTier::Management,
            61..=80 => PrivilegeTier::Staff,
            81..=100 => PrivilegeTier::BasicUser,
            _ => PrivilegeTier::Unknown,
        }
    }
}

impl From<i32> for PrivilegeLevel {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Named bands of privilege levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeTier {
    PlatformAdmin,
    OrganizationAdmin,
    EntityAdmin,
    Medical,
    Management,
    Staff,
    BasicUser,
    Unknown,
}

impl PrivilegeTier {
    pub fn label(&self) -> &'static str {
        match self {
            PrivilegeTier::PlatformAdmin => "Platform Admin",
            PrivilegeTier::OrganizationAdmin => "Organization Admin",
            PrivilegeTier::EntityAdmin => "Entity Admin",
            PrivilegeTier::Medical => "Medical/HMS",
            PrivilegeTier::Management => "Management",
            PrivilegeTier::Staff => "Staff",
            PrivilegeTier::BasicUser => "Basic User",
            PrivilegeTier::Unknown => "Unknown",
        }
    }
}

/// Label shown for a (possibly absent) privilege level.
pub fn privilege_name(level: Option<PrivilegeLevel>) -> &'static str {
    match level {
        Some(level) => level.tier().label(),
        None => "No Access",
    }
}

/// `user` holds at least the authority of `required`. Absent inputs never pass.
pub fn has_privilege_level(user: Option<PrivilegeLevel>, required: Option<PrivilegeLevel>) -> bool {
    match (user, required) {
        (Some(user), Some(required)) => user.satisfies(required),
        _ => false,
    }
}
