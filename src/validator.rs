//! Decides whether a receipt may be uploaded, based solely on its filename extension.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The message shown under the file input when a file is rejected. Existing UI tests match on it,
/// so it must not change.
pub const REJECTION_MESSAGE: &str = "Veuillez charger un fichier au format jpg, jpeg ou png";

/// The receipt formats that may be uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptFormat {
    Jpg,
    Jpeg,
    Png,
}

serde_plain::derive_display_from_serialize!(ReceiptFormat);
serde_plain::derive_fromstr_from_deserialize!(ReceiptFormat);

/// The outcome of validating a filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    accepted: bool,
    /// Empty when `accepted` is `true`.
    error_message: String,
}

impl Validation {
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// Validates `filename` against the accepted receipt formats. The extension is the text after the
/// final `.`, compared case-insensitively; a name without a `.` has an empty extension and is
/// rejected.
pub fn validate(filename: &str) -> Validation {
    match receipt_format(filename) {
        Some(_) => Validation {
            accepted: true,
            error_message: String::new(),
        },
        None => Validation {
            accepted: false,
            error_message: REJECTION_MESSAGE.to_string(),
        },
    }
}

/// Returns the receipt format named by the extension of `filename`, if it is one we accept.
pub fn receipt_format(filename: &str) -> Option<ReceiptFormat> {
    let (_, extension) = filename.rsplit_once('.')?;
    ReceiptFormat::from_str(&extension.to_lowercase()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions() {
        for name in [
            "file.png",
            "file.jpg",
            "file.jpeg",
            "FILE.PNG",
            "scan.JpEg",
            "my.receipt.jpg",
            ".png",
        ] {
            let v = validate(name);
            assert!(v.accepted(), "{name} should be accepted");
            assert_eq!(v.error_message(), "", "{name}");
        }
    }

    #[test]
    fn test_rejected_extensions() {
        for name in [
            "file.pdf",
            "file.gif",
            "file",
            "",
            "file.",
            "png",
            "file.png.pdf",
            "file.pn",
            "file. png",
        ] {
            let v = validate(name);
            assert!(!v.accepted(), "{name} should be rejected");
            assert_eq!(
                v.error_message(),
                "Veuillez charger un fichier au format jpg, jpeg ou png",
                "{name}"
            );
        }
    }

    #[test]
    fn test_receipt_format() {
        assert_eq!(receipt_format("a.JPG"), Some(ReceiptFormat::Jpg));
        assert_eq!(receipt_format("a.jpeg"), Some(ReceiptFormat::Jpeg));
        assert_eq!(receipt_format("a.png"), Some(ReceiptFormat::Png));
        assert_eq!(receipt_format("a.webp"), None);
        assert_eq!(ReceiptFormat::Jpeg.to_string(), "jpeg");
    }
}
