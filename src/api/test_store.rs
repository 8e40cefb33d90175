//! Implements the `BillStore` trait in memory.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a bill store server.

use crate::api::BillStore;
use crate::error::StoreError;
use crate::model::{BillPayload, DraftCreated, DraftForm};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

const FILE_URL_PREFIX: &str = "https://localhost:3456/images";

/// A call received by a `TestBillStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    CreateBillDraft { file_name: String, email: String },
    UpdateBill { id: Option<String>, payload: BillPayload },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<StoreCall>,
    bills: HashMap<String, Option<BillPayload>>,
    create_error: Option<StoreError>,
    update_error: Option<StoreError>,
}

/// An in-memory bill store. Clones share the same state, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct TestBillStore {
    state: Arc<Mutex<State>>,
}

impl TestBillStore {
    /// Makes every subsequent draft creation fail with `error`.
    pub fn fail_create(&self, error: StoreError) {
        self.lock().create_error = Some(error);
    }

    /// Makes every subsequent bill update fail with `error`.
    pub fn fail_update(&self, error: StoreError) {
        self.lock().update_error = Some(error);
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::CreateBillDraft { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::UpdateBill { .. }))
            .count()
    }

    /// The stored bill with `id`. The outer `Option` is whether a draft with that id exists, the
    /// inner one whether it has been updated with a payload yet.
    pub fn bill(&self, id: &str) -> Option<Option<BillPayload>> {
        self.lock().bills.get(id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl BillStore for TestBillStore {
    async fn create_bill_draft(&self, form: DraftForm) -> Result<DraftCreated, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::CreateBillDraft {
            file_name: form.file().name().to_string(),
            email: form.email().to_string(),
        });
        if let Some(e) = &state.create_error {
            return Err(e.clone());
        }
        let key = Uuid::new_v4().simple().to_string();
        state.bills.insert(key.clone(), None);
        debug!("Created draft bill {key}");
        Ok(DraftCreated::new(
            format!("{FILE_URL_PREFIX}/{}", form.file().name()),
            key,
        ))
    }

    async fn update_bill(&self, id: Option<&str>, payload: &BillPayload) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall::UpdateBill {
            id: id.map(str::to_string),
            payload: payload.clone(),
        });
        if let Some(e) = &state.update_error {
            return Err(e.clone());
        }
        let id = id.unwrap_or("null").to_string();
        match state.bills.get_mut(&id) {
            Some(bill) => {
                *bill = Some(payload.clone());
                Ok(())
            }
            None => Err(StoreError::with_status(404, format!("Bill '{id}' not found"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FormValues, PendingUpload, UploadedFile};

    #[tokio::test]
    async fn test_create_then_update() {
        let store = TestBillStore::default();
        let draft = store
            .create_bill_draft(DraftForm::new(UploadedFile::new("r.png", vec![1, 2]), "a@a"))
            .await
            .unwrap();
        assert_eq!(draft.file_url(), "https://localhost:3456/images/r.png");
        assert_eq!(store.bill(draft.key()), Some(None));

        let upload = PendingUpload::from_draft(draft.clone(), "r.png");
        let payload = BillPayload::new("a@a", &FormValues::new(), &upload);
        store.update_bill(Some(draft.key()), &payload).await.unwrap();
        assert_eq!(store.bill(draft.key()), Some(Some(payload)));
        assert_eq!(store.create_count(), 1);
        assert_eq!(store.update_count(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_bill() {
        let store = TestBillStore::default();
        let payload = BillPayload::new("a@a", &FormValues::new(), &PendingUpload::default());
        let e = store.update_bill(None, &payload).await.unwrap_err();
        assert_eq!(e.status(), Some(404));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = TestBillStore::default();
        store.fail_create(StoreError::new("500"));
        let e = store
            .create_bill_draft(DraftForm::new(UploadedFile::new("r.png", vec![]), "a@a"))
            .await
            .unwrap_err();
        assert_eq!(e, StoreError::new("500"));
        // The failed call is still recorded.
        assert_eq!(store.create_count(), 1);
    }
}
