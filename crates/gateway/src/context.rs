use portalguard_core::Credential;

use crate::RouteClass;

/// Gateway outcome attached to every request it lets through.
///
/// Protected routes always carry the verified credential; public routes
/// never do (the gateway does not look for one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayContext {
    route: RouteClass,
    credential: Option<Credential>,
}

impl GatewayContext {
    pub fn public() -> Self {
        Self {
            route: RouteClass::Public,
            credential: None,
        }
    }

    pub fn verified(credential: Credential) -> Self {
        Self {
            route: RouteClass::Protected,
            credential: Some(credential),
        }
    }

    pub fn route(&self) -> RouteClass {
        self.route
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}
