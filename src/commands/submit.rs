//! The `billed submit` command: one full lifecycle of the new bill form.

use crate::api::{self, FileSession, Mode, TracingNavigator};
use crate::args::SubmitArgs;
use crate::commands::Out;
use crate::controller::{BillSubmissionController, FileChange, FileChangeOutcome, NewBillContext};
use crate::model::{BillPayload, FormField, FormValues, PendingUpload, Route, UploadedFile};
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// What `billed submit` did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SubmitReport {
    /// The draft created by the receipt upload, empty when there was none.
    upload: PendingUpload,
    /// The bill that was sent to the store.
    payload: BillPayload,
    /// Whether the store accepted the update.
    updated: bool,
    /// Where the application went after the submit.
    route: Option<Route>,
}

impl SubmitReport {
    pub fn upload(&self) -> &PendingUpload {
        &self.upload
    }

    pub fn payload(&self) -> &BillPayload {
        &self.payload
    }

    pub fn updated(&self) -> bool {
        self.updated
    }

    pub fn route(&self) -> Option<Route> {
        self.route
    }
}

/// Uploads the receipt named in `args` (if any), then submits the bill and waits for the store to
/// settle the update.
///
/// Persistence failures do not fail the command, they are logged and show up in the report. A
/// receipt with a rejected extension does fail it, before anything is submitted.
///
/// # Errors
/// - Nobody is logged in.
/// - The receipt cannot be read or has a rejected extension.
pub async fn submit(config: Config, mode: Mode, args: SubmitArgs) -> Result<Out<SubmitReport>> {
    let session = FileSession::open(config.session_path()).await?;
    let store = api::bill_store(&config, session.jwt(), mode)?;
    let navigator = TracingNavigator::new();
    let ordering = args.upload_ordering().unwrap_or(config.upload_ordering());
    let context = NewBillContext::new(Arc::new(session), Arc::new(navigator.clone()))
        .with_store(store)
        .with_ordering(ordering);
    let controller = BillSubmissionController::new(context);

    if let Some(path) = args.file() {
        let change = file_change(path).await?;
        match controller.on_file_change(change).await? {
            FileChangeOutcome::Rejected(validation) => {
                bail!("{}: {}", path.display(), validation.error_message())
            }
            outcome => debug!("Receipt upload: {outcome:?}"),
        }
    }

    let submission = controller.on_submit(form_values(&args))?;
    let payload = submission.payload().clone();
    let updated = submission.settled().await.is_ok();
    let upload = controller.pending_upload();

    let message = match (updated, upload.bill_id()) {
        (true, Some(id)) => format!("Submitted bill {id}"),
        (true, None) => "Submitted the bill without a receipt".to_string(),
        (false, _) => {
            "The bill was submitted but the store did not accept it, see the log".to_string()
        }
    };
    Ok(Out::new(
        message,
        SubmitReport {
            upload,
            payload,
            updated,
            route: navigator.current(),
        },
    ))
}

async fn file_change(path: &Path) -> Result<FileChange> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' does not name a file", path.display()))?;
    let bytes = utils::read_bytes(path).await?;
    Ok(FileChange::new(
        UploadedFile::new(name, bytes),
        path.to_string_lossy(),
    ))
}

fn form_values(args: &SubmitArgs) -> FormValues {
    FormValues::new()
        .with(FormField::ExpenseType, args.expense_type().to_string())
        .with(FormField::ExpenseName, args.name())
        .with(FormField::Amount, args.amount())
        .with(FormField::Date, args.date().format("%Y-%m-%d").to_string())
        .with(FormField::Vat, args.vat())
        .with(FormField::Pct, args.pct())
        .with(FormField::Commentary, args.commentary())
}
