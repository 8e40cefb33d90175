//! The new bill form controller.
//!
//! A bill is persisted in two phases. When a receipt is picked in the file input, it is validated
//! and uploaded, which creates a draft bill in the store; the draft's identifiers are kept in a
//! `PendingUpload`. When the form is submitted, the full bill is built from the form values and the
//! `PendingUpload` and sent to the store as an update of the draft, and the application moves on to
//! the bill list whatever the outcome of that update.
//!
//! Only a rejected file is reported to the user. Failures of either persistence phase go to the
//! `Diagnostics` port and nowhere else.

use crate::api::{BillStore, Diagnostics, Navigator, SessionStore, TracingDiagnostics};
use crate::error::{Failure, StoreError};
use crate::model::{BillPayload, DraftForm, FormValues, PendingUpload, Route, UploadedFile};
use crate::utils::last_path_segment;
use crate::validator::{self, Validation};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// How the controller handles the responses of overlapping uploads, i.e. when the file is changed
/// again before the previous upload has answered.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum UploadOrdering {
    /// Whichever response arrives last is kept, even if it belongs to an older upload.
    #[default]
    LastResponse,
    /// Each upload is numbered; a response older than the upload currently held is discarded.
    LatestAttempt,
}

serde_plain::derive_display_from_serialize!(UploadOrdering);
serde_plain::derive_fromstr_from_deserialize!(UploadOrdering);

/// The collaborators of a `BillSubmissionController`, handed over once at construction.
#[derive(Clone)]
pub struct NewBillContext {
    session: Arc<dyn SessionStore>,
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    diagnostics: Arc<dyn Diagnostics>,
    ordering: UploadOrdering,
}

impl NewBillContext {
    /// A context without a bill store, reporting failures to `TracingDiagnostics`.
    pub fn new(session: Arc<dyn SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            store: None,
            navigator,
            diagnostics: Arc::new(TracingDiagnostics),
            ordering: UploadOrdering::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn BillStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_ordering(mut self, ordering: UploadOrdering) -> Self {
        self.ordering = ordering;
        self
    }
}

/// The file input's change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    file: UploadedFile,
    /// The raw value of the file input, which may carry a folder prefix such as
    /// `C:\fakepath\receipt.png`.
    input_value: String,
}

impl FileChange {
    pub fn new(file: UploadedFile, input_value: impl Into<String>) -> Self {
        Self {
            file,
            input_value: input_value.into(),
        }
    }

    /// The file's name from the input value, without any folder prefix. Falls back to the file's
    /// own name when the input value is empty.
    fn file_name(&self) -> &str {
        match last_path_segment(&self.input_value) {
            "" => self.file.name(),
            name => name,
        }
    }
}

impl From<UploadedFile> for FileChange {
    fn from(file: UploadedFile) -> Self {
        let input_value = file.name().to_string();
        Self::new(file, input_value)
    }
}

/// What became of a file change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChangeOutcome {
    /// The extension was not accepted. The store was not called.
    Rejected(Validation),
    /// The draft was created and is now the pending upload.
    Uploaded(PendingUpload),
    /// The draft creation failed. The failure was reported to diagnostics.
    UploadFailed(StoreError),
    /// The draft was created, but a newer upload is already held, so the response was dropped.
    Discarded,
    /// There is no store to upload to. This was reported to diagnostics.
    NoStore,
}

/// Where the controller is in its lifecycle. Validation is synchronous, so it is never observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Idle,
    Uploading,
    Submitting,
}

#[derive(Debug, Default)]
struct State {
    pending: PendingUpload,
    /// The number of the upload that produced `pending`, 0 when there is none.
    pending_attempt: u64,
    /// The number given to the most recent upload.
    attempts: u64,
    uploads_in_flight: usize,
    submissions_in_flight: usize,
    /// `None` until a file has been picked.
    allowed_extension: Option<bool>,
    error_message: String,
    file_input_value: String,
}

/// Drives the new bill form: validates and uploads receipts, then submits the bill.
///
/// Clones share the same state, so the handlers can be registered with several event sources and
/// run concurrently.
#[derive(Clone)]
pub struct BillSubmissionController {
    context: NewBillContext,
    state: Arc<Mutex<State>>,
}

impl BillSubmissionController {
    pub fn new(context: NewBillContext) -> Self {
        Self {
            context,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Handles a new file in the file input.
    ///
    /// A rejected file sets the error message, clears the file input and leaves the pending upload
    /// as it was. An accepted file clears the error message and is uploaded; the pending upload is
    /// replaced only if the upload succeeds. Upload failures are reported to diagnostics and do not
    /// change the acceptance of the file.
    ///
    /// # Errors
    /// Only when there is no session to take the user's email from.
    pub async fn on_file_change(&self, event: FileChange) -> Result<FileChangeOutcome> {
        let validation = validator::validate(event.file.name());
        {
            let mut state = self.lock();
            state.allowed_extension = Some(validation.accepted());
            if !validation.accepted() {
                debug!("Rejected '{}'", event.file.name());
                state.error_message = validation.error_message().to_string();
                state.file_input_value.clear();
                return Ok(FileChangeOutcome::Rejected(validation));
            }
            state.error_message.clear();
            state.file_input_value = event.input_value.clone();
        }

        let file_name = event.file_name().to_string();
        let email = self.context.session.current_user_email()?;

        let store = match &self.context.store {
            Some(store) => store.clone(),
            None => {
                self.context.diagnostics.report(&Failure::MissingStore);
                return Ok(FileChangeOutcome::NoStore);
            }
        };

        let attempt = {
            let mut state = self.lock();
            state.attempts += 1;
            state.uploads_in_flight += 1;
            state.attempts
        };
        trace!("Uploading '{file_name}' as attempt {attempt}");
        let result = store
            .create_bill_draft(DraftForm::new(event.file, email))
            .await;

        let mut state = self.lock();
        state.uploads_in_flight -= 1;
        match result {
            Ok(draft) => {
                if self.context.ordering == UploadOrdering::LatestAttempt
                    && attempt < state.pending_attempt
                {
                    debug!(
                        "Discarding the response of upload {attempt}, upload {} is newer",
                        state.pending_attempt
                    );
                    return Ok(FileChangeOutcome::Discarded);
                }
                state.pending = PendingUpload::from_draft(draft, file_name);
                state.pending_attempt = attempt;
                debug!("Created draft bill {:?}", state.pending.bill_id());
                Ok(FileChangeOutcome::Uploaded(state.pending.clone()))
            }
            Err(e) => {
                drop(state);
                self.context.diagnostics.report(&Failure::Upload(e.clone()));
                Ok(FileChangeOutcome::UploadFailed(e))
            }
        }
    }

    /// Handles the form's submit event.
    ///
    /// Builds the bill from `values` and the current pending upload, starts updating the draft in
    /// the background and navigates to the bill list right away. The navigation happens exactly
    /// once, whatever the outcome of the update; a failed update is only reported to diagnostics.
    /// The returned `Submission` can be awaited to know when the update has settled.
    ///
    /// # Errors
    /// - There is no session to take the user's email from.
    /// - It is called outside of a Tokio runtime, so the update cannot be started.
    ///
    /// Nothing is sent, no navigation happens and the phase is unchanged in either case.
    pub fn on_submit(&self, values: FormValues) -> Result<Submission> {
        let email = self.context.session.current_user_email()?;
        let runtime = Handle::try_current()
            .context("A bill can only be submitted from within a Tokio runtime")?;
        let (payload, bill_id) = {
            let mut state = self.lock();
            // Counted before the task exists so that its decrement always comes second.
            state.submissions_in_flight += 1;
            let payload = BillPayload::new(email, &values, &state.pending);
            (payload, state.pending.bill_id().map(str::to_string))
        };

        let store = self.context.store.clone();
        let diagnostics = self.context.diagnostics.clone();
        let state = self.state.clone();
        let sent = payload.clone();
        let task = runtime.spawn(async move {
            let outcome = match store {
                Some(store) => store
                    .update_bill(bill_id.as_deref(), &sent)
                    .await
                    .map_err(Failure::Update),
                None => Err(Failure::MissingStore),
            };
            if let Err(failure) = &outcome {
                diagnostics.report(failure);
            }
            lock(&state).submissions_in_flight -= 1;
            outcome
        });

        self.context.navigator.navigate_to(Route::Bills);
        Ok(Submission { payload, task })
    }

    /// A copy of the pending upload.
    pub fn pending_upload(&self) -> PendingUpload {
        self.lock().pending.clone()
    }

    /// Whether the last picked file had an accepted extension, `None` before any file was picked.
    pub fn allowed_extension(&self) -> Option<bool> {
        self.lock().allowed_extension
    }

    /// The text of the error message element below the file input.
    pub fn error_message(&self) -> String {
        self.lock().error_message.clone()
    }

    /// The value of the file input; empty after a rejected file.
    pub fn file_input_value(&self) -> String {
        self.lock().file_input_value.clone()
    }

    pub fn phase(&self) -> Phase {
        let state = self.lock();
        if state.submissions_in_flight > 0 {
            Phase::Submitting
        } else if state.uploads_in_flight > 0 {
            Phase::Uploading
        } else {
            Phase::Idle
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// A submitted bill whose update may still be on its way to the store.
#[derive(Debug)]
pub struct Submission {
    payload: BillPayload,
    task: JoinHandle<std::result::Result<(), Failure>>,
}

impl Submission {
    /// The bill that was sent.
    pub fn payload(&self) -> &BillPayload {
        &self.payload
    }

    /// Waits for the update to settle. A failure returned here has already been reported to
    /// diagnostics.
    pub async fn settled(self) -> std::result::Result<(), Failure> {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(Failure::Update(StoreError::new(e.to_string()))),
        }
    }
}
