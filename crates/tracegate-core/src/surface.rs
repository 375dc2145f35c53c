//! Per-front-end constants.
//!
//! Both front-ends share the same contracts and differ only in their storage
//! slot and route configuration.

use crate::api::client::DEFAULT_API_PREFIX;
use crate::nav::{RouteDescriptor, RouteTable};

#[derive(Debug, Clone)]
pub struct Surface {
    pub name: String,
    /// Credential slot name.
    pub storage_key: String,
    pub login_path: String,
    /// Landing page after authentication.
    pub home_path: String,
    pub api_prefix: String,
    pub routes: Vec<RouteDescriptor>,
}

impl Surface {
    /// Administrative console: batch management behind a login.
    pub fn admin() -> Self {
        Self {
            name: "admin".to_string(),
            storage_key: "admin_token".to_string(),
            login_path: "/login".to_string(),
            home_path: "/batches".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            routes: vec![
                RouteDescriptor::new("/login").named("Login"),
                RouteDescriptor::new("/").redirect_to("/batches"),
                RouteDescriptor::new("/batches").named("BatchList").requires_auth(),
            ],
        }
    }

    /// Public mobile site: trace lookups, no protected routes.
    pub fn mobile() -> Self {
        Self {
            name: "mobile".to_string(),
            storage_key: "h5_token".to_string(),
            login_path: "/login".to_string(),
            home_path: "/trace".to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            routes: vec![
                RouteDescriptor::new("/trace/:batchId?").named("TraceResult"),
                RouteDescriptor::new("/:pathMatch(.*)*").redirect_to("/trace"),
            ],
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "admin" => Some(Self::admin()),
            "mobile" | "h5" => Some(Self::mobile()),
            _ => None,
        }
    }

    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_routes() {
        let surface = Surface::admin();
        let table = surface.route_table();
        assert!(table.resolve("/batches").requires_auth);
        assert!(!table.resolve(&surface.login_path).requires_auth);
        assert_eq!(table.resolve("/").redirect.as_deref(), Some("/batches"));
    }

    #[test]
    fn test_mobile_has_no_protected_routes() {
        let surface = Surface::mobile();
        assert!(surface.routes.iter().all(|r| !r.is_protected()));
        assert_eq!(surface.route_table().resolve("/anything").redirect.as_deref(), Some("/trace"));
    }

    #[test]
    fn test_by_name() {
        assert_eq!(Surface::by_name("admin").map(|s| s.storage_key), Some("admin_token".to_string()));
        assert_eq!(Surface::by_name("h5").map(|s| s.name), Some("mobile".to_string()));
        assert!(Surface::by_name("kiosk").is_none());
    }
}
