use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the billed home directory and an initial `config.json` file in it.
///
/// # Arguments
/// - `billed_home` - The directory that will be the billed home, e.g. `$HOME/billed`
/// - `api_url` - The base URL of the bill store; the default is used when `None`.
///
/// # Errors
/// - Returns an error if the URL is invalid or any file operations fail.
pub async fn init(billed_home: &Path, api_url: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(billed_home, api_url)
        .await
        .context("Unable to create the billed home directory and config")?;
    Ok(format!(
        "Successfully created the billed directory at {}, using the bill store at {}",
        config.root().display(),
        config.api_url()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("billed");
        let out = init(&home, Some("http://localhost:5678")).await.unwrap();
        assert!(out.message().contains("Successfully created"));
        assert!(home.join("config.json").is_file());
    }
}
