//! Types for the first phase of a submission: uploading the receipt and creating a draft bill.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Formatter};

/// A file picked in the form's file input. Only its `name` is consulted by validation; its bytes
/// are forwarded to the store untouched.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for UploadedFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The multipart body of a draft creation request: the receipt and the submitter's email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftForm {
    file: UploadedFile,
    email: String,
}

impl DraftForm {
    pub fn new(file: UploadedFile, email: impl Into<String>) -> Self {
        Self {
            file,
            email: email.into(),
        }
    }

    pub fn file(&self) -> &UploadedFile {
        &self.file
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// The store's answer to a draft creation: where the receipt now lives and the id of the draft
/// bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCreated {
    file_url: String,
    key: String,
}

impl DraftCreated {
    pub fn new(file_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
            key: key.into(),
        }
    }

    pub fn file_url(&self) -> &str {
        &self.file_url
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Bridges the two phases of a submission within one form lifecycle. The three values are either
/// all `None` (no upload has completed) or all `Some`, because they are only ever set together from
/// a successful draft creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpload {
    file_url: Option<String>,
    file_name: Option<String>,
    bill_id: Option<String>,
}

impl PendingUpload {
    pub fn new(
        file_url: impl Into<String>,
        file_name: impl Into<String>,
        bill_id: impl Into<String>,
    ) -> Self {
        Self {
            file_url: Some(file_url.into()),
            file_name: Some(file_name.into()),
            bill_id: Some(bill_id.into()),
        }
    }

    /// Builds the record for a successful draft creation of the file named `file_name`.
    pub fn from_draft(draft: DraftCreated, file_name: impl Into<String>) -> Self {
        Self::new(draft.file_url, file_name, draft.key)
    }

    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn bill_id(&self) -> Option<&str> {
        self.bill_id.as_deref()
    }

    /// Returns `true` when no upload has completed yet.
    pub fn is_empty(&self) -> bool {
        self.bill_id.is_none()
    }
}
