use anyhow::Context;
use async_trait::async_trait;
use latch_common::{
    params::AuthLoginParams,
    views::{ApiErrorResponse, AuthGrant},
};
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiClientError {
    #[error("API error: {}", .0.message)]
    ApiError(ApiErrorResponse),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl ApiClientError {
    /// The message worth showing to a user, if there is one.
    pub fn message(&self) -> Option<String> {
        let message = match self {
            ApiClientError::ApiError(body) => body.message.clone(),
            other => other.to_string(),
        };
        Some(message).filter(|m| !m.trim().is_empty())
    }
}

/// The network half of logging in. Implementations exchange credentials for
/// an [`AuthGrant`]; they do not touch local state.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiClientError>;

    async fn register(&self, email: &str, password: &str) -> Result<AuthGrant, ApiClientError>;
}

pub struct ApiClient {
    api_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self, ApiClientError> {
        let client = Client::builder()
            .user_agent(format!("latch/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_url: api_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post<TBody, TResult>(&self, path: &str, body: &TBody) -> Result<TResult, ApiClientError>
    where
        TBody: serde::ser::Serialize,
        TResult: serde::de::DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.json::<ApiErrorResponse>().await.map_err(|e| {
                anyhow::anyhow!(
                    "POST {} failed with status {} and invalid error response: {}",
                    url,
                    status,
                    e
                )
            })?;
            return Err(ApiClientError::ApiError(body));
        }

        Ok(response
            .json::<TResult>()
            .await
            .with_context(|| format!("Failed to parse response from POST {url}"))?)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiClientError> {
        let params = AuthLoginParams {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/v1/auth/login", &params).await
    }

    async fn register(&self, email: &str, password: &str) -> Result<AuthGrant, ApiClientError> {
        let params = AuthLoginParams {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/v1/auth/register", &params).await
    }
}
