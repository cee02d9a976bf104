//! HTTP client for the loan backend
//!
//! Every call goes through [`ApiClient::execute`]: the bearer token is
//! attached, transport failures become `NetworkUnavailable`, non-2xx responses
//! become `Remote`. Nothing is retried.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Session;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    Envelope, LoanApplication, LoanApplicationRequest, LoginRequest, LoginResponse, Profile,
    ProfileUpdate, RegisterRequest, UploadResponse,
};

use super::endpoints;

/// Client for the loan backend REST API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<Session>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client: build_http(builder, config.request_timeout),
            session,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Same backend, different session (after login/logout)
    pub fn with_session(&self, session: Arc<Session>) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build an authenticated request; fails before any I/O without a token
    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self.session.bearer()?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send a request and return the raw success body
    async fn execute(&self, request: RequestBuilder, method: &Method, path: &str) -> ClientResult<String> {
        tracing::debug!(%method, path, "Sending request");

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request did not reach the backend");
            ClientError::NetworkUnavailable(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkUnavailable(e.to_string()))?;

        if !status.is_success() {
            let err = ClientError::from_response(status.as_u16(), status.canonical_reason(), &body);
            tracing::warn!(%method, path, status = status.as_u16(), error = %err, "Backend rejected request");
            return Err(err);
        }

        tracing::debug!(%method, path, status = status.as_u16(), "Request succeeded");
        Ok(body)
    }

    /// Authenticated call decoding a (possibly enveloped) JSON payload
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<T> {
        let raw = self.call_raw(method, path, query, body).await?;
        decode(&raw)
    }

    /// Authenticated call whose response body is not needed
    pub(crate) async fn call_raw(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> ClientResult<String> {
        let mut request = self.authed(method.clone(), path)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        self.execute(request, &method, path).await
    }

    // ========================================================================
    // Applicant and account endpoints
    // ========================================================================

    /// POST /api/users/login (no token required)
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<LoginResponse> {
        let request = self.anonymous(Method::POST, endpoints::LOGIN).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        });
        let raw = self.execute(request, &Method::POST, endpoints::LOGIN).await?;
        tracing::info!(email, "Login succeeded");
        decode(&raw)
    }

    /// POST /api/users/register (no token required)
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<()> {
        let builder = self.anonymous(Method::POST, endpoints::REGISTER).json(request);
        self.execute(builder, &Method::POST, endpoints::REGISTER).await?;
        Ok(())
    }

    /// GET /api/auth/profile
    pub async fn profile(&self) -> ClientResult<Profile> {
        self.call(Method::GET, endpoints::PROFILE, &[], None).await
    }

    /// PUT /api/auth/profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<Profile> {
        self.call(Method::PUT, endpoints::PROFILE, &[], Some(to_body(update)?))
            .await
    }

    /// GET /api/loans/user/{id}
    pub async fn user_loan(&self, id: &str) -> ClientResult<LoanApplication> {
        self.call(Method::GET, &endpoints::user_loan(id), &[], None)
            .await
    }

    /// POST /api/loans/apply
    pub async fn apply(&self, application: &LoanApplicationRequest) -> ClientResult<LoanApplication> {
        let loan: LoanApplication = self
            .call(Method::POST, endpoints::APPLY, &[], Some(to_body(application)?))
            .await?;
        tracing::info!(loan_id = %loan.id, "Loan application submitted");
        Ok(loan)
    }

    /// POST /api/upload as multipart field `file`
    pub async fn upload(&self, file: &Path) -> ClientResult<UploadResponse> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(file_name),
        );

        let request = self.authed(Method::POST, endpoints::UPLOAD)?.multipart(form);
        let raw = self.execute(request, &Method::POST, endpoints::UPLOAD).await?;
        decode(&raw)
    }
}

/// Build the configured client, or fall back to reqwest defaults with a warning
fn build_http(builder: ClientBuilder, timeout: Option<Duration>) -> Client {
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(
                error = %e,
                timeout = ?timeout,
                "Failed to build HTTP client, falling back to defaults without a request timeout"
            );
            Client::new()
        }
    }
}

pub(crate) fn to_body<T: Serialize>(value: &T) -> ClientResult<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn decode<T: DeserializeOwned>(raw: &str) -> ClientResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(raw)?;
    Ok(envelope.into_inner())
}
