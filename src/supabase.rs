// src/supabase.rs
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::auth::{AuthBackend, AuthError, Identity, Session};
use crate::config::Config;

/// Client for the hosted Supabase auth (GoTrue) REST API.
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    user: UserPayload,
}

// Sign-up answers with a session when confirmation is off, a bare user otherwise.
#[derive(Debug, Deserialize)]
struct SignUpPayload {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl From<UserPayload> for Identity {
    fn from(user: UserPayload) -> Self {
        Identity {
            id: user.id,
            email: user.email,
        }
    }
}

impl SupabaseAuth {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.endpoint(path))
            .header("apikey", &self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AuthError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(provider_error(response).await)
    }
}

async fn provider_error(response: Response) -> AuthError {
    let status = response.status();
    let body: ErrorPayload = response.json().await.unwrap_or_default();
    let message = body
        .error_description
        .or(body.msg)
        .or(body.message)
        .or(body.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Authentication failed")
                .to_string()
        });

    debug!(status = status.as_u16(), %message, "auth provider rejected request");
    AuthError::Provider {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl AuthBackend for SupabaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = self
            .post("token")
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let token: TokenPayload = self.send(request).await?.json().await?;
        Ok(Session {
            access_token: token.access_token,
            identity: token.user.into(),
        })
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, AuthError> {
        let request = self
            .post("signup")
            .json(&json!({ "email": email, "password": password }));

        let payload: SignUpPayload = self.send(request).await?.json().await?;
        Ok(match (payload.access_token, payload.user) {
            (Some(access_token), Some(user)) => Some(Session {
                access_token,
                identity: user.into(),
            }),
            _ => None,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.send(self.post("logout").bearer_auth(access_token)).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str, redirect_to: &str) -> Result<(), AuthError> {
        let request = self
            .post("recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }));

        self.send(request).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: UserPayload = response.json().await?;
                Ok(Some(user.into()))
            }
            _ => Err(provider_error(response).await),
        }
    }
}
