//! Session command handlers:
//! - `billed login` - store the employee session
//! - `billed logout` - remove it and go back to the login page

use crate::api::{FileSession, Navigator, SessionFile, TracingNavigator};
use crate::commands::Out;
use crate::model::Route;
use crate::{Config, Result};

/// Stores an employee session for `email`, with an optional bearer token for the bill store.
pub async fn login(config: &Config, email: &str, jwt: Option<&str>) -> Result<Out<()>> {
    anyhow::ensure!(!email.trim().is_empty(), "The email must not be empty");
    let mut session = FileSession::open(config.session_path()).await?;
    session
        .login(SessionFile::employee(email.trim(), jwt.map(str::to_string)))
        .await?;
    Ok(format!("Logged in as {}", email.trim()).into())
}

/// Removes the stored session and navigates back to the login page.
pub async fn logout(config: &Config) -> Result<Out<Route>> {
    let mut session = FileSession::open(config.session_path()).await?;
    let was_logged_in = session.logout().await?;
    let navigator = TracingNavigator::new();
    navigator.navigate_to(Route::Login);
    let message = if was_logged_in {
        "Logged out"
    } else {
        "Nobody was logged in"
    };
    Ok(Out::new(message, navigator.current().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionStore;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_login_then_logout() {
        let env = TestEnv::new().await;
        let config = env.config();

        login(&config, " employee@test.tld ", None).await.unwrap();
        let session = FileSession::open(config.session_path()).await.unwrap();
        assert_eq!(session.current_user_email().unwrap(), "employee@test.tld");

        let out = logout(&config).await.unwrap();
        assert_eq!(out.message(), "Logged out");
        assert_eq!(out.structure(), Some(&Route::Login));
        assert!(!config.session_path().exists());

        let out = logout(&config).await.unwrap();
        assert_eq!(out.message(), "Nobody was logged in");
    }

    #[tokio::test]
    async fn test_login_empty_email() {
        let env = TestEnv::new().await;
        assert!(login(&env.config(), "  ", None).await.is_err());
    }
}
