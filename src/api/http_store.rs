//! Implements the `BillStore` trait with `reqwest`, against the Billed REST API.
//!
//! - Draft creation: `POST {api_url}/bills` with a multipart body holding `file` and `email`.
//! - Bill update: `PATCH {api_url}/bills/{id}` with the JSON payload.

use crate::api::BillStore;
use crate::error::StoreError;
use crate::model::{BillPayload, DraftCreated, DraftForm};
use crate::{Config, Result};
use anyhow::Context;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use tracing::trace;
use url::Url;

const BILLS: &str = "bills";

/// Talks to a Billed bill store over HTTP. Requests carry `Authorization: Bearer {token}` when the
/// session holds a token.
#[derive(Debug, Clone)]
pub struct HttpBillStore {
    client: reqwest::Client,
    api_url: Url,
    token: Option<String>,
}

impl HttpBillStore {
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url().clone(),
            token,
        })
    }

    /// Builds `{api_url}/bills` or `{api_url}/bills/{id}`.
    fn bills_url(&self, id: Option<&str>) -> std::result::Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::new(format!("Invalid API URL '{}'", self.api_url)))?;
            segments.pop_if_empty().push(BILLS);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl BillStore for HttpBillStore {
    async fn create_bill_draft(
        &self,
        form: DraftForm,
    ) -> std::result::Result<DraftCreated, StoreError> {
        let url = self.bills_url(None)?;
        trace!("create_bill_draft {url}");
        let file = form.file();
        let body = Form::new()
            .part(
                "file",
                Part::bytes(file.bytes().to_vec()).file_name(file.name().to_string()),
            )
            .text("email", form.email().to_string());
        let response = self
            .authorize(self.client.post(url))
            .multipart(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<DraftCreated>().await?)
    }

    async fn update_bill(
        &self,
        id: Option<&str>,
        payload: &BillPayload,
    ) -> std::result::Result<(), StoreError> {
        // Without a draft id the request goes to `bills/null`, and the store answers for it.
        let url = self.bills_url(Some(id.unwrap_or("null")))?;
        trace!("update_bill {url}");
        let response = self
            .authorize(self.client.patch(url))
            .json(payload)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turns a non-success response into a `StoreError` carrying its status and body.
async fn check_status(response: Response) -> std::result::Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    Err(StoreError::with_status(status.as_u16(), body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_bills_url() {
        let env = TestEnv::new().await;
        let store = HttpBillStore::new(&env.config(), None).unwrap();
        assert_eq!(
            store.bills_url(None).unwrap().as_str(),
            "http://localhost:5678/bills"
        );
        assert_eq!(
            store.bills_url(Some("47qAXb6fIm2zOKkLzMro")).unwrap().as_str(),
            "http://localhost:5678/bills/47qAXb6fIm2zOKkLzMro"
        );
    }

    #[tokio::test]
    async fn test_unreachable_store_is_a_store_error() {
        // Nothing listens on a port that was just released.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let env = TestEnv::with_api_url(&format!("http://{addr}")).await;
        let store = HttpBillStore::new(&env.config(), Some("jwt".into())).unwrap();
        let payload = BillPayload::new(
            "a@a",
            &crate::model::FormValues::new(),
            &crate::model::PendingUpload::default(),
        );
        let e = store.update_bill(Some("1"), &payload).await.unwrap_err();
        assert!(e.status().is_none());
    }
}
