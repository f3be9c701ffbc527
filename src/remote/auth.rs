use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{BackendConfig, SecurityConfig};

use super::{AuthService, RemoteError, RemoteResult};

/// Authenticated user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Token pair plus the user it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionUser,
}

impl Session {
    /// True when the access token expires within `skew` of `now`
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at <= now + skew
    }
}

/// Claims carried by the auth service's access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub exp: i64,
}

/// Verify an HS256 access token locally and return its claims
pub fn decode_access_token(token: &str, secret: &str) -> RemoteResult<AccessClaims> {
    if secret.is_empty() {
        return Err(RemoteError::ConfigMissing("SUPABASE_JWT_SECRET"));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&["authenticated"]);

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| RemoteError::Unauthorized(format!("Invalid access token: {}", e)))?;
    Ok(data.claims)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    user: UserResponse,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: Uuid,
    email: Option<String>,
}

impl From<UserResponse> for SessionUser {
    fn from(user: UserResponse) -> Self {
        Self { id: user.id, email: user.email }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3600)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Client for the managed backend's auth REST API
#[derive(Debug, Clone)]
pub struct SupabaseAuth {
    client: Client,
    base_url: String,
    anon_key: String,
    jwt_secret: String,
}

impl SupabaseAuth {
    pub fn new(backend: &BackendConfig, security: &SecurityConfig) -> RemoteResult<Self> {
        if backend.url.is_empty() {
            return Err(RemoteError::ConfigMissing("SUPABASE_URL"));
        }
        let client = Client::builder()
            .timeout(StdDuration::from_secs(backend.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: backend.url.clone(),
            anon_key: backend.anon_key.clone(),
            jwt_secret: security.jwt_secret.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.anon_key)
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> RemoteResult<Session> {
        let response = self
            .request(self.client.post(self.endpoint("token")))
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("token response: {}", e)))?;
        Ok(token.into_session(Utc::now()))
    }
}

#[async_trait]
impl AuthService for SupabaseAuth {
    async fn login(&self, email: &str, password: &str) -> RemoteResult<Session> {
        debug!("password grant for {}", email);
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn logout(&self, access_token: &str) -> RemoteResult<()> {
        let response = self
            .request(self.client.post(self.endpoint("logout")))
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn refresh(&self, session: &Session) -> RemoteResult<Session> {
        debug!("refreshing session for {}", session.user.id);
        self.token_grant("refresh_token", json!({ "refresh_token": session.refresh_token }))
            .await
    }

    async fn validate(&self, access_token: &str) -> RemoteResult<SessionUser> {
        if !self.jwt_secret.is_empty() {
            let claims = decode_access_token(access_token, &self.jwt_secret)?;
            return Ok(SessionUser { id: claims.sub, email: claims.email });
        }

        let response = self
            .request(self.client.get(self.endpoint("user")))
            .bearer_auth(access_token)
            .send()
            .await?;
        let response = check_status(response).await?;
        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("user response: {}", e)))?;
        Ok(user.into())
    }
}

/// Map non-success responses to `RemoteError`, extracting the service's message
pub(crate) async fn check_status(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or("request failed")
        .to_string();

    warn!("backend responded {}: {}", status, message);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized(message)),
        // the auth service answers bad credentials with 400 invalid_grant
        StatusCode::BAD_REQUEST if body.get("error").and_then(Value::as_str) == Some("invalid_grant") => {
            Err(RemoteError::Unauthorized(message))
        }
        StatusCode::NOT_FOUND => Err(RemoteError::NotFound(message)),
        _ => Err(RemoteError::Rejected { status: status.as_u16(), message }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, aud: &str, exp: i64) -> String {
        let claims = json!({
            "sub": "5f8d0d55-6f1a-4c1e-9a43-2b9c1c0f6e11",
            "email": "admin@example.com",
            "role": "authenticated",
            "aud": aud,
            "exp": exp,
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn decodes_valid_access_token() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let claims = decode_access_token(&token("s3cret", "authenticated", exp), "s3cret").unwrap();
        assert_eq!(claims.email.as_deref(), Some("admin@example.com"));
        assert_eq!(claims.exp, exp);
    }

    #[test]
    fn rejects_wrong_secret_and_audience() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        assert!(decode_access_token(&token("s3cret", "authenticated", exp), "other").is_err());
        assert!(decode_access_token(&token("s3cret", "anon", exp), "s3cret").is_err());
    }

    #[test]
    fn token_response_prefers_absolute_expiry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let response: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "expires_at": 1_700_000_600,
            "user": { "id": "5f8d0d55-6f1a-4c1e-9a43-2b9c1c0f6e11", "email": null }
        }))
        .unwrap();
        let session = response.into_session(now);
        assert_eq!(session.expires_at.timestamp(), 1_700_000_600);
        assert!(session.is_expired(now + Duration::seconds(590), Duration::seconds(60)));
        assert!(!session.is_expired(now, Duration::seconds(60)));
    }
}
