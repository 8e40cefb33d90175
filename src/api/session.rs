//! Session storage. The logged-in user is kept in `$BILLED_HOME/session.json`, which plays the part
//! of the browser's `localStorage["user"]` entry.

use crate::api::SessionStore;
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const EMPLOYEE: &str = "Employee";

/// The serialized session.
///
/// Example:
/// ```json
/// {
///   "type": "Employee",
///   "email": "employee@test.tld",
///   "jwt": "eyJhbGciOi..."
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(rename = "type")]
    user_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwt: Option<String>,
}

impl SessionFile {
    /// A session for an employee.
    pub fn employee(email: impl Into<String>, jwt: Option<String>) -> Self {
        Self {
            user_type: EMPLOYEE.to_string(),
            email: Some(email.into()),
            jwt,
        }
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }
}

/// A `SessionStore` backed by the session file. The file is read once when the `FileSession` is
/// opened; a missing file simply means nobody is logged in.
#[derive(Debug, Clone)]
pub struct FileSession {
    path: PathBuf,
    session: Option<SessionFile>,
}

impl FileSession {
    /// Reads the session at `path`, if there is one.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let session = if path.is_file() {
            Some(utils::deserialize::<SessionFile>(&path).await?)
        } else {
            debug!("No session file at {}", path.display());
            None
        };
        Ok(Self { path, session })
    }

    /// Writes `session` to the file and makes it the current session.
    pub async fn login(&mut self, session: SessionFile) -> Result<()> {
        let json = serde_json::to_string_pretty(&session).context("Unable to serialize session")?;
        utils::write(&self.path, json).await?;
        self.session = Some(session);
        Ok(())
    }

    /// Removes the session file. Returns `false` when nobody was logged in.
    pub async fn logout(&mut self) -> Result<bool> {
        let was_logged_in = self.path.is_file();
        if was_logged_in {
            utils::remove(&self.path).await?;
        }
        self.session = None;
        Ok(was_logged_in)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Option<&SessionFile> {
        self.session.as_ref()
    }

    /// The bearer token of the current session, if any.
    pub fn jwt(&self) -> Option<String> {
        self.session
            .as_ref()
            .and_then(|s| s.jwt())
            .map(str::to_string)
    }
}

impl SessionStore for FileSession {
    fn current_user_email(&self) -> Result<String> {
        self.session
            .as_ref()
            .and_then(|s| s.email())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "No user is logged in (no email in '{}'). Run 'billed login' first.",
                    self.path.display()
                )
            })
    }
}

/// A `SessionStore` with a fixed user, or with no user at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSession(Option<String>);

impl StaticSession {
    pub fn new(email: impl Into<String>) -> Self {
        Self(Some(email.into()))
    }

    /// A session store where nobody is logged in.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionStore for StaticSession {
    fn current_user_email(&self) -> Result<String> {
        self.0.clone().context("No user is logged in")
    }
}
