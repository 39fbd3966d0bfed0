//! Controller REST endpoint paths.
//!
//! Resource paths are versioned per resource type and scoped by tenant.

/// Default controller URI.
pub const DEFAULT_CONTROLLER: &str = "https://api.elcapitan.cloudgenix.com";

/// API version used for login, profile and element resources.
pub const ELEMENTS_API_VERSION: &str = "v2.0";

/// API version used for interface resources.
pub const INTERFACES_API_VERSION: &str = "v4.7";

/// Header carrying a static API token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Header the controller sets when the tenant lives in another region.
pub const REDIRECT_REGION_HEADER: &str = "x-redirect-region";

/// Login endpoint (POST).
pub fn login() -> String {
    format!("/{}/api/login", ELEMENTS_API_VERSION)
}

/// Profile endpoint (GET), returns the tenant of the session.
pub fn profile() -> String {
    format!("/{}/api/profile", ELEMENTS_API_VERSION)
}

/// Element collection of a tenant.
pub fn elements(tenant_id: &str) -> String {
    format!(
        "/{}/api/tenants/{}/elements",
        ELEMENTS_API_VERSION, tenant_id
    )
}

/// Interface collection of an element.
pub fn interfaces(tenant_id: &str, site_id: &str, element_id: &str) -> String {
    format!(
        "/{}/api/tenants/{}/sites/{}/elements/{}/interfaces",
        INTERFACES_API_VERSION, tenant_id, site_id, element_id
    )
}

/// A single interface.
pub fn interface(tenant_id: &str, site_id: &str, element_id: &str, interface_id: &str) -> String {
    format!(
        "{}/{}",
        interfaces(tenant_id, site_id, element_id),
        interface_id
    )
}

/// Rewrites a controller URI for a region redirect.
///
/// `https://api.<domain>` becomes `https://api-<region>.<domain>`. URIs whose
/// host does not start with `api.` are returned unchanged.
pub fn regional_controller(controller: &str, region: &str) -> String {
    let (scheme, rest) = match controller.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, controller),
    };

    let Some(domain) = rest.strip_prefix("api.") else {
        return controller.to_string();
    };

    match scheme {
        Some(scheme) => format!("{}://api-{}.{}", scheme, region, domain),
        None => format!("api-{}.{}", region, domain),
    }
}
