//! Shared test utilities for creating test environments and observing the controller's
//! collaborators.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::{BillStore, Diagnostics, Navigator};
use crate::error::{Failure, StoreError};
use crate::model::{BillPayload, DraftCreated, DraftForm, Route};
use crate::Config;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::oneshot;

/// Test environment that sets up a billed home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment whose config points at the default API URL.
    pub async fn new() -> Self {
        Self::create(None).await
    }

    /// Creates a test environment whose config points at `api_url`.
    pub async fn with_api_url(api_url: &str) -> Self {
        Self::create(Some(api_url)).await
    }

    async fn create(api_url: Option<&str>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("billed");
        let config = Config::create(&root, api_url).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }
}

/// A `Diagnostics` port that keeps every failure it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics(Arc<Mutex<Vec<Failure>>>);

impl RecordingDiagnostics {
    pub fn failures(&self) -> Vec<Failure> {
        self.0.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, failure: &Failure) {
        self.0.lock().unwrap().push(failure.clone());
    }
}

/// A `Navigator` that keeps every route it is sent to.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator(Arc<Mutex<Vec<Route>>>);

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.0.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, route: Route) {
        self.0.lock().unwrap().push(route);
    }
}

type DraftResult = Result<DraftCreated, StoreError>;

/// A `BillStore` whose draft creations do not answer until the test releases them, so that the
/// order in which responses arrive can be chosen. Updates succeed immediately.
#[derive(Debug, Clone, Default)]
pub struct GatedStore {
    gates: Arc<Mutex<Vec<Option<oneshot::Sender<DraftResult>>>>>,
}

impl GatedStore {
    /// The number of draft creations received so far.
    pub fn received(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    /// Answers the draft creation that arrived in position `index` (0-based) with `result`.
    pub fn release(&self, index: usize, result: DraftResult) {
        let sender = self.gates.lock().unwrap()[index]
            .take()
            .expect("draft creation already released");
        sender.send(result).unwrap();
    }
}

#[async_trait::async_trait]
impl BillStore for GatedStore {
    async fn create_bill_draft(&self, _form: DraftForm) -> DraftResult {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(sender));
        receiver
            .await
            .unwrap_or_else(|_| Err(StoreError::new("gate dropped")))
    }

    async fn update_bill(
        &self,
        _id: Option<&str>,
        _payload: &BillPayload,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}
