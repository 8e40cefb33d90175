//! Types that represent the core data model, such as `BillPayload` and `PendingUpload`.
mod bill;
mod form;
mod route;
mod upload;

pub use bill::{BillPayload, BillStatus, ExpenseType, DEFAULT_PCT};
pub use form::{FormField, FormValues};
pub use route::Route;
pub use upload::{DraftCreated, DraftForm, PendingUpload, UploadedFile};
