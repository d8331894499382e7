//! REST implementation of the back office collaborators.

use super::{PermissionSource, SessionSource};
use crate::error::BackendError;
use crate::permission::Permission;
use crate::user::{Credentials, UserRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use teller_common_config::{ApiConfig, EndpointsConfig};
use teller_common_http::{error_message, parse_json, HttpClient, HttpConfig, HttpError, RequestBuilder};
use tracing::{debug, instrument};

const LOGIN_FAILED: &str = "Login failed";

/// One row of `GET /functions`.
#[derive(Debug, Deserialize)]
struct FunctionItem {
    function_name: String,
}

/// `/functions` answers either `{ "data": [...] }` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FunctionsResponse {
    Wrapped { data: Vec<FunctionItem> },
    Bare(Vec<FunctionItem>),
}

impl FunctionsResponse {
    fn into_permissions(self) -> Vec<Permission> {
        let items = match self {
            Self::Wrapped { data } => data,
            Self::Bare(items) => items,
        };
        items
            .into_iter()
            .map(|item| Permission::new(item.function_name))
            .collect()
    }
}

/// Profile and login payloads may be wrapped in `user` or `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    User { user: UserRecord },
    Data { data: UserRecord },
    Bare(UserRecord),
}

impl UserEnvelope {
    fn into_user(self) -> UserRecord {
        match self {
            Self::User { user } | Self::Data { data: user } | Self::Bare(user) => user,
        }
    }
}

/// Back office REST client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: HttpClient,
    endpoints: EndpointsConfig,
}

impl HttpBackend {
    /// Wrap an existing client with default endpoint paths.
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            endpoints: EndpointsConfig::default(),
        }
    }

    /// Build the client from the `api` config section.
    pub fn from_config(api: &ApiConfig) -> Result<Self, HttpError> {
        let mut request = RequestBuilder::new().base_url(&api.base_url).json_api();
        if let Some(token) = &api.token {
            request = request.bearer_auth(token);
        }

        let config = HttpConfig {
            connect_timeout: Duration::from_secs(api.connect_timeout_secs),
            request_timeout: Duration::from_secs(api.request_timeout_secs),
            ..HttpConfig::default()
        };

        Ok(Self {
            client: HttpClient::with_config(request, config)?,
            endpoints: api.endpoints.clone(),
        })
    }

    /// Override endpoint paths.
    pub fn with_endpoints(mut self, endpoints: EndpointsConfig) -> Self {
        self.endpoints = endpoints;
        self
    }
}

#[async_trait]
impl PermissionSource for HttpBackend {
    #[instrument(skip(self), fields(path = %self.endpoints.functions))]
    async fn fetch_permissions(&self) -> Result<Vec<Permission>, BackendError> {
        let response = self.client.get(&self.endpoints.functions).await?;
        let response = HttpClient::check_response(response).await?;
        let body: FunctionsResponse = parse_json(response).await?;
        let permissions = body.into_permissions();
        debug!(count = permissions.len(), "fetched permission catalog");
        Ok(permissions)
    }
}

#[async_trait]
impl SessionSource for HttpBackend {
    #[instrument(skip(self), fields(path = %self.endpoints.user_profile))]
    async fn fetch_profile(&self) -> Result<Option<UserRecord>, BackendError> {
        let response = self.client.get(&self.endpoints.user_profile).await?;
        let response = match HttpClient::check_response(response).await {
            Ok(response) => response,
            Err(e) if e.is_unauthorized() => {
                debug!("no active session");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let body: UserEnvelope = parse_json(response).await?;
        Ok(Some(body.into_user()))
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    async fn login(&self, credentials: &Credentials) -> Result<UserRecord, BackendError> {
        let response = self.client.post_json(&self.endpoints.login, credentials).await?;
        let response = match HttpClient::check_response(response).await {
            Ok(response) => response,
            Err(HttpError::ClientError { status, body }) => {
                return Err(BackendError::Rejected {
                    status,
                    message: error_message(&body).unwrap_or_else(|| LOGIN_FAILED.to_string()),
                });
            }
            Err(e) => return Err(e.into()),
        };
        let body: UserEnvelope = parse_json(response).await?;
        Ok(body.into_user())
    }

    #[instrument(skip(self), fields(path = %self.endpoints.logout))]
    async fn logout(&self) -> Result<(), BackendError> {
        let response = self.client.post(&self.endpoints.logout).await?;
        HttpClient::check_response(response).await?;
        Ok(())
    }
}
