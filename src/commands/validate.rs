use crate::commands::Out;
use crate::validator::{self, Validation};
use crate::Result;
use anyhow::Context;
use std::path::Path;

/// Checks whether `file` would be accepted as a receipt. Only the file name is looked at; the file
/// does not need to exist.
pub fn validate(file: &Path) -> Result<Out<Validation>> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("'{}' does not name a file", file.display()))?;
    let validation = validator::validate(name);
    let message = if validation.accepted() {
        format!("'{name}' can be uploaded as a receipt")
    } else {
        format!("'{name}': {}", validation.error_message())
    };
    Ok(Out::new(message, validation))
}

#[test]
fn test_validate_command() {
    let out = validate(Path::new("/tmp/scans/receipt.JPG")).unwrap();
    assert!(out.structure().unwrap().accepted());
    assert_eq!(out.message(), "'receipt.JPG' can be uploaded as a receipt");

    let out = validate(Path::new("invoice.pdf")).unwrap();
    assert!(!out.structure().unwrap().accepted());
    assert!(out
        .message()
        .ends_with("Veuillez charger un fichier au format jpg, jpeg ou png"));

    assert!(validate(Path::new("/")).is_err());
}
