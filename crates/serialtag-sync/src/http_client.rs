//! HTTP implementation of the controller API.
//!
//! Wraps a `reqwest::Client` bound to one controller. A session is
//! established either with a static token (`X-Auth-Token` header) or with an
//! email/password login (session cookies, plus the token from the login body
//! when the controller returns one). Both paths end with a profile lookup
//! that yields the tenant id every resource path is scoped by.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use serialtag_common::{
    ApiError, ApiResult, ControllerApi, Element, Interface, Items, SyncError, SyncResult,
};

use crate::auth::Session;
use crate::endpoints;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// User agent sent with every request.
const USER_AGENT: &str = concat!("serialtagsync/", env!("CARGO_PKG_VERSION"));

/// Connection settings for [`HttpController`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpControllerConfig {
    /// Controller base URI.
    pub controller: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Ignore region redirect headers.
    pub ignore_region: bool,
}

impl Default for HttpControllerConfig {
    fn default() -> Self {
        Self {
            controller: endpoints::DEFAULT_CONTROLLER.to_string(),
            insecure: false,
            ignore_region: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    x_auth_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    tenant_id: Option<String>,
}

/// Controller API over HTTPS.
pub struct HttpController {
    client: reqwest::Client,
    controller: String,
    ignore_region: bool,
    auth_token: Option<String>,
    tenant_id: Option<String>,
}

impl HttpController {
    /// Creates a client for the configured controller.
    pub fn new(config: HttpControllerConfig) -> SyncResult<Self> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Creates a client from a caller-prepared builder (e.g., with DNS
    /// overrides). Timeout, cookies and TLS settings are applied on top.
    pub fn with_builder(
        config: HttpControllerConfig,
        builder: reqwest::ClientBuilder,
    ) -> SyncResult<Self> {
        let client = builder
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .cookie_store(true)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| SyncError::HttpClient {
                message: e.to_string(),
            })?;

        if config.insecure {
            info!("TLS certificate verification disabled");
        }

        Ok(Self {
            client,
            controller: config.controller.trim_end_matches('/').to_string(),
            ignore_region: config.ignore_region,
            auth_token: None,
            tenant_id: None,
        })
    }

    /// Returns the controller URI currently in use.
    pub fn controller(&self) -> &str {
        &self.controller
    }

    /// Returns the tenant of the session, if logged in.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    fn tenant(&self, operation: &str) -> ApiResult<&str> {
        self.tenant_id
            .as_deref()
            .ok_or_else(|| ApiError::not_authenticated(operation))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.controller, path);
        debug!(%method, %url, "API request");

        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.header(endpoints::AUTH_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn send(&self, operation: &str, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::transport(operation, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::status(operation, status.as_u16(), body));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> ApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::decode(operation, e.to_string()))
    }

    fn follow_region(&mut self, headers: &HeaderMap) {
        if self.ignore_region {
            return;
        }
        let Some(region) = headers
            .get(endpoints::REDIRECT_REGION_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|region| !region.is_empty())
        else {
            return;
        };

        let regional = endpoints::regional_controller(&self.controller, region);
        if regional != self.controller {
            info!(region = %region, controller = %regional, "Following region redirect");
            self.controller = regional;
        }
    }

    async fn fetch_profile(&mut self) -> ApiResult<Option<String>> {
        let operation = "get profile";
        let response = self
            .send(operation, self.request(Method::GET, &endpoints::profile()))
            .await?;
        self.follow_region(response.headers());

        let profile: ProfileResponse = Self::decode(operation, response).await?;
        self.tenant_id = profile.tenant_id.filter(|t| !t.is_empty());
        Ok(self.tenant_id.clone())
    }
}

#[async_trait]
impl Session for HttpController {
    #[instrument(skip(self, token))]
    async fn use_token(&mut self, token: &str) -> ApiResult<Option<String>> {
        self.auth_token = Some(token.to_string());
        self.fetch_profile().await
    }

    #[instrument(skip(self, password))]
    async fn login(&mut self, email: &str, password: &str) -> ApiResult<Option<String>> {
        let operation = "login";
        self.auth_token = None;
        self.tenant_id = None;

        let body = json!({ "email": email, "password": password });
        let response = self
            .send(
                operation,
                self.request(Method::POST, &endpoints::login()).json(&body),
            )
            .await?;
        self.follow_region(response.headers());

        let login: LoginResponse = response.json().await.unwrap_or_default();
        if let Some(token) = login.x_auth_token.filter(|t| !t.is_empty()) {
            self.auth_token = Some(token);
        }

        self.fetch_profile().await
    }
}

#[async_trait]
impl ControllerApi for HttpController {
    async fn list_elements(&self) -> ApiResult<Vec<Element>> {
        let operation = "get elements";
        let tenant = self.tenant(operation)?;
        let response = self
            .send(operation, self.request(Method::GET, &endpoints::elements(tenant)))
            .await?;
        let items: Items<Element> = Self::decode(operation, response).await?;
        Ok(items.into_items())
    }

    async fn list_interfaces(
        &self,
        site_id: &str,
        element_id: &str,
    ) -> ApiResult<Vec<Interface>> {
        let operation = "get interfaces";
        let tenant = self.tenant(operation)?;
        let path = endpoints::interfaces(tenant, site_id, element_id);
        let response = self
            .send(operation, self.request(Method::GET, &path))
            .await?;
        let items: Items<Interface> = Self::decode(operation, response).await?;
        Ok(items.into_items())
    }

    async fn update_interface(
        &self,
        site_id: &str,
        element_id: &str,
        interface_id: &str,
        interface: &Interface,
    ) -> ApiResult<()> {
        let operation = "put interface";
        let tenant = self.tenant(operation)?;
        let path = endpoints::interface(tenant, site_id, element_id, interface_id);
        let response = self
            .send(operation, self.request(Method::PUT, &path).json(interface))
            .await?;
        debug!(status = %response.status(), interface = %interface_id, "Interface updated");
        Ok(())
    }
}
