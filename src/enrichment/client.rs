use std::time::Duration;

use reqwest::{Client, Response};

use super::error::CaseError;
use super::types::{AuthResponse, OutputEnvelope};

/// Fetches the output node for an item name.
#[allow(async_fn_in_trait)]
pub trait OutputFetcher {
    async fn fetch_output(&self, item_name: &str) -> Result<OutputEnvelope, CaseError>;
}

/// Authenticated client for the case-management REST API.
pub struct CaseClient {
    client: Client,
    base_url: String,
    case_id: String,
    ticket: String,
}

impl CaseClient {
    /// Authenticate with username/password and keep the session ticket.
    pub async fn connect(
        base_url: &str,
        case_id: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, CaseError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let ticket = authenticate(&client, &base_url, username, password).await?;

        Ok(Self {
            client,
            base_url,
            case_id: case_id.to_string(),
            ticket,
        })
    }
}

async fn authenticate(
    client: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String, CaseError> {
    let response = client
        .post(format!("{base_url}/api/v1/auth"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await?;

    let body = check_status(response).await?.text().await?;
    let auth: AuthResponse =
        serde_json::from_str(&body).map_err(|e| CaseError::Parse(e.to_string()))?;
    Ok(auth.ticket)
}

async fn check_status(response: Response) -> Result<Response, CaseError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(CaseError::RateLimited);
    }

    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        return Err(CaseError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response)
}

impl OutputFetcher for CaseClient {
    async fn fetch_output(&self, item_name: &str) -> Result<OutputEnvelope, CaseError> {
        let response = self
            .client
            .get(format!("{}/api/v1/nodes/{}/output", self.base_url, self.case_id))
            .query(&[("key", item_name)])
            .header("otcsticket", &self.ticket)
            .send()
            .await?;

        let body = check_status(response).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| CaseError::Parse(e.to_string()))
    }
}
