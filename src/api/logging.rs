//! `Diagnostics` and `Navigator` implementations that report through `tracing`.

use crate::api::{Diagnostics, Navigator};
use crate::error::Failure;
use crate::model::Route;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Sends every failure to `error!`, with the failure value attached as a field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, failure: &Failure) {
        error!(failure = ?failure, "{failure}");
    }
}

/// Logs navigation and remembers the route the application is on.
#[derive(Debug, Clone, Default)]
pub struct TracingNavigator {
    current: Arc<Mutex<Option<Route>>>,
}

impl TracingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last route navigated to, if any.
    pub fn current(&self) -> Option<Route> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for TracingNavigator {
    fn navigate_to(&self, route: Route) {
        info!("Navigating to {route:?} ('{route}')");
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = Some(route);
    }
}

#[test]
fn test_tracing_navigator_remembers_route() {
    let navigator = TracingNavigator::new();
    assert_eq!(navigator.current(), None);
    navigator.navigate_to(Route::Bills);
    assert_eq!(navigator.current(), Some(Route::Bills));
}
