//! `portalguard-auth` — privilege resolution for the portal.
//!
//! Pure and synchronous: callers pass an immutable snapshot of roles and
//! role assignments, this crate never performs IO.

pub mod explain;
pub mod permissions;
pub mod privilege;
pub mod privileges;
pub mod roles;

pub use explain::{AccessExplanation, DenialKind, DenialReason, explain_permission};
pub use permissions::{FeatureModule, Permission};
pub use privilege::{PrivilegeLevel, PrivilegeTier, has_privilege_level, privilege_name};
pub use privileges::{
    DEFAULT_ROLE_DISPLAY_NAME, ResolvedPrivileges, aggregate, has_all_permissions,
    has_any_module, has_any_permission, has_module, has_permission, primary_role_display_name,
};
pub use roles::{Role, RoleAssignment};
