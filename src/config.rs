//! Configuration file handling for billed.
//!
//! The configuration file is stored at `$BILLED_HOME/config.json` and contains the address of the
//! bill store along with settings for how the submission controller talks to it.

use crate::controller::UploadOrdering;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "billed";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";
const DEFAULT_API_URL: &str = "http://localhost:5678";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BILLED_HOME` and from there it loads `$BILLED_HOME/config.json`. It also provides
/// the paths of files that are expected in a certain location within the billed home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    session_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the billed home directory and an initial `config.json` file in it.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the billed home, e.g. `$HOME/billed`
    /// - `api_url` - The base URL of the bill store, e.g. `http://localhost:5678`. The default is
    ///   used when `None`.
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not a valid URL or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_url: Option<&str>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the billed home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_file = ConfigFile {
            api_url: api_url.unwrap_or(DEFAULT_API_URL).to_string(),
            ..ConfigFile::default()
        };
        let api_url = parse_api_url(&config_file.api_url)?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        Ok(Self {
            session_path: root.join(SESSION_JSON),
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that `billed_home` exists and that the config file exists
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(billed_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = billed_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Billed Home is missing, run 'billed init' first")?;
        let _ = utils::read_dir(&root)
            .await
            .context("Billed Home is not a directory")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)?;

        Ok(Self {
            session_path: root.join(SESSION_JSON),
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where the logged-in user is stored.
    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    pub fn upload_ordering(&self) -> UploadOrdering {
        self.config_file.upload_ordering
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "billed",
///   "config_version": 1,
///   "api_url": "http://localhost:5678",
///   "request_timeout_secs": 30,
///   "upload_ordering": "last-response"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "billed"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the bill store
    api_url: String,

    /// Timeout, in seconds, for each request to the bill store
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// What to do when the responses of overlapping uploads arrive out of order
    #[serde(default)]
    upload_ordering: UploadOrdering,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upload_ordering: UploadOrdering::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn parse_api_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Invalid api_url '{s}'"))?;
    if url.cannot_be_a_base() {
        bail!("The api_url '{s}' cannot be used as a base URL");
    }
    Ok(url)
}
