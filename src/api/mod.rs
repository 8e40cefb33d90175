//! The collaborators of the bill submission controller, expressed as traits, along with the
//! implementations this crate ships for them.
//!
//! - `SessionStore`: who is logged in.
//! - `BillStore`: the remote store where drafts are created and bills are updated.
//! - `Navigator`: moves the host application to another page.
//! - `Diagnostics`: receives the persistence failures that are not shown to the user.

mod http_store;
mod logging;
mod session;
mod test_store;

use crate::error::{Failure, StoreError};
use crate::model::{BillPayload, DraftCreated, DraftForm, Route};
use crate::{Config, Result};
use std::sync::Arc;
use tracing::debug;

pub use http_store::HttpBillStore;
pub use logging::{TracingDiagnostics, TracingNavigator};
pub use session::{FileSession, SessionFile, StaticSession};
pub use test_store::{StoreCall, TestBillStore};

/// When this environment variable is set to a non-empty value, the program uses an in-memory
/// `TestBillStore` instead of talking to a real bill store over HTTP.
pub const TEST_MODE_ENV: &str = "BILLED_IN_TEST_MODE";

/// Provides the email address of the logged-in user.
pub trait SessionStore: Send + Sync {
    /// Returns the current user's email, or an error when there is no session.
    fn current_user_email(&self) -> Result<String>;
}

/// The remote store that bills are persisted to, in two phases.
#[async_trait::async_trait]
pub trait BillStore: Send + Sync {
    /// Uploads the receipt in `form` and creates a draft bill for it.
    async fn create_bill_draft(
        &self,
        form: DraftForm,
    ) -> std::result::Result<DraftCreated, StoreError>;

    /// Replaces the bill identified by `id` with `payload`. `id` is `None` when no draft was ever
    /// created for this form.
    async fn update_bill(
        &self,
        id: Option<&str>,
        payload: &BillPayload,
    ) -> std::result::Result<(), StoreError>;
}

/// Moves the host application to another page.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, route: Route);
}

/// The diagnostic channel. It receives the failure value itself, not a formatted message.
pub trait Diagnostics: Send + Sync {
    fn report(&self, failure: &Failure);
}

/// Which `BillStore` implementation the program uses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Talk to the bill store at the configured `api_url`.
    #[default]
    Http,
    /// Use an in-memory store.
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `BILLED_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the `BillStore` for `mode`. The HTTP store authenticates with `token` when one is given.
pub fn bill_store(
    config: &Config,
    token: Option<String>,
    mode: Mode,
) -> Result<Arc<dyn BillStore>> {
    debug!("Using the {mode:?} bill store");
    let store: Arc<dyn BillStore> = match mode {
        Mode::Http => Arc::new(HttpBillStore::new(config, token)?),
        Mode::Test => Arc::new(TestBillStore::default()),
    };
    Ok(store)
}

#[test]
fn test_mode_default() {
    assert_eq!(Mode::default(), Mode::Http);
}
