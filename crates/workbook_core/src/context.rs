//! Request context passed explicitly through every core call.
//!
//! # Invariants
//! - Tenant scope comes only from the context, never from request payloads.
//! - Contexts are immutable once built; callers construct a new one per request.

use crate::config::FeatureFlags;

/// Caller identity and deployment flags for one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: String,
    pub user_id: String,
    pub project_id: Option<String>,
    /// Internal routes bypass access-control registration.
    pub is_private_route: bool,
    pub features: FeatureFlags,
}

impl RequestContext {
    /// Public-route context with all features disabled.
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            project_id: None,
            is_private_route: false,
            features: FeatureFlags::default(),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn private_route(mut self) -> Self {
        self.is_private_route = true;
        self
    }

    /// Whether mutations must register access bindings.
    pub fn should_register_access(&self) -> bool {
        self.features.access_service_enabled
            && self.features.access_bindings_service_enabled
            && !self.is_private_route
    }
}

#[cfg(test)]
mod tests {
    use super::RequestContext;
    use crate::config::FeatureFlags;

    const ALL_ON: FeatureFlags = FeatureFlags {
        access_service_enabled: true,
        access_bindings_service_enabled: true,
    };

    #[test]
    fn registration_requires_both_flags_and_public_route() {
        let ctx = RequestContext::new("t1", "u1").with_features(ALL_ON);
        assert!(ctx.should_register_access());

        assert!(!ctx.clone().private_route().should_register_access());

        let half = RequestContext::new("t1", "u1").with_features(FeatureFlags {
            access_service_enabled: true,
            access_bindings_service_enabled: false,
        });
        assert!(!half.should_register_access());
        assert!(!RequestContext::new("t1", "u1").should_register_access());
    }
}
