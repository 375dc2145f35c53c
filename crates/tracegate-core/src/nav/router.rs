use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::guard::REDIRECT_PARAM;
use super::{Guard, Navigator, Outcome, Route, RouteTable};

/// Upper bound on redirects followed for a single navigation.
const MAX_REDIRECTS: usize = 10;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouterError {
    #[error("Not an in-app path: {0}")]
    InvalidPath(String),

    #[error("Too many redirects while navigating to {0}")]
    RedirectLoop(String),
}

/// How a navigation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The route was entered. `redirected_from` is the location originally
    /// requested when static records or guards sent the router elsewhere.
    Committed {
        route: Route,
        redirected_from: Option<String>,
    },
    /// A guard aborted the transition; the location is unchanged.
    Aborted { route: Route },
}

impl Navigation {
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Committed { route, .. } | Navigation::Aborted { route } => route,
        }
    }
}

/// Client-side router: resolves targets against the route table, runs the
/// guards and commits the final location to the navigator.
pub struct Router {
    table: RouteTable,
    guards: Vec<Arc<dyn Guard>>,
    navigator: Arc<dyn Navigator>,
    home_path: String,
}

impl Router {
    pub fn new(table: RouteTable, navigator: Arc<dyn Navigator>, home_path: impl Into<String>) -> Self {
        Self {
            table,
            guards: Vec::new(),
            navigator,
            home_path: home_path.into(),
        }
    }

    /// Register a guard. Guards run in registration order; the first one
    /// that does not allow decides.
    pub fn before_each(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// The route at the navigator's current location.
    pub fn current(&self) -> Route {
        self.table.resolve(&self.navigator.location())
    }

    fn run_guards(&self, to: &Route, from: &Route) -> Outcome {
        for guard in &self.guards {
            match guard.check(to, Some(from)) {
                Outcome::Allow => continue,
                other => return other,
            }
        }
        Outcome::Allow
    }

    /// Navigate to an in-app location.
    pub fn push(&self, target: &str) -> Result<Navigation, RouterError> {
        if !target.starts_with('/') {
            return Err(RouterError::InvalidPath(target.to_string()));
        }

        let from = self.current();
        let mut target = target.to_string();
        let mut redirected_from: Option<String> = None;

        for _ in 0..=MAX_REDIRECTS {
            let route = self.table.resolve(&target);

            if let Some(ref next) = route.redirect {
                debug!(from = %route.full_path, to = %next, "Route record redirect");
                redirected_from.get_or_insert_with(|| route.full_path.clone());
                target = next.clone();
                continue;
            }

            match self.run_guards(&route, &from) {
                Outcome::Allow => {
                    self.navigator.navigate(&route.full_path);
                    return Ok(Navigation::Committed {
                        route,
                        redirected_from,
                    });
                }
                Outcome::Redirect(next) => {
                    info!(from = %route.full_path, to = %next, "Navigation redirected by guard");
                    redirected_from.get_or_insert_with(|| route.full_path.clone());
                    target = next;
                }
                Outcome::Abort => {
                    info!(to = %route.full_path, "Navigation aborted by guard");
                    return Ok(Navigation::Aborted { route });
                }
            }
        }

        Err(RouterError::RedirectLoop(redirected_from.unwrap_or(target)))
    }

    /// Leave the login page after a credential has been stored: go to the
    /// return target carried by the current location, or home.
    pub fn after_login(&self) -> Result<Navigation, RouterError> {
        let current = self.current();
        let target = current
            .query_param(REDIRECT_PARAM)
            .filter(|t| is_safe_return_target(t))
            .unwrap_or(self.home_path.as_str())
            .to_string();
        self.push(&target)
    }
}

/// Only same-origin absolute paths are followed after login.
fn is_safe_return_target(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.contains('\\')
}
