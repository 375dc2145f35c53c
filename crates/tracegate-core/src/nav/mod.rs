//! Route-level authorization for in-app navigation.
//!
//! - `RouteDescriptor` / `RouteTable`: static route configuration and path
//!   resolution
//! - `Guard` / `AuthGuard`: the decision run before every transition
//! - `Router`: resolves a target, applies static redirects and guards, and
//!   commits the result to a `Navigator`
//! - `Navigator`: the current location and a way to leave it

pub mod guard;
pub mod navigator;
pub mod route;
pub mod router;

pub use guard::{AuthGuard, Guard, Outcome};
pub use navigator::{HistoryNavigator, Navigator};
pub use route::{with_query, Route, RouteDescriptor, RouteTable};
pub use router::{Navigation, Router, RouterError};
