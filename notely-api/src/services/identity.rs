use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity asserted by a third-party provider after token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub email_verified: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("google sign-in is not configured")]
    NotConfigured,

    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError>;
}

/// Verifies Google ID tokens against the `tokeninfo` endpoint and checks
/// that the audience is our client id.
pub struct GoogleVerifier {
    client: Client,
    client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    sub: String,
    aud: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl GoogleVerifier {
    pub fn new(client_id: Option<String>) -> Result<Self, IdentityError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            client_id: client_id.filter(|id| !id.trim().is_empty()),
        })
    }
}

impl TokenInfo {
    fn into_identity(self, expected_audience: &str) -> Result<ExternalIdentity, IdentityError> {
        if self.aud != expected_audience {
            return Err(IdentityError::Rejected("audience mismatch".into()));
        }
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| IdentityError::Rejected("token carries no email".into()))?;

        // tokeninfo encodes booleans as strings.
        let email_verified = matches!(
            self.email_verified,
            Some(serde_json::Value::Bool(true))
        ) || matches!(&self.email_verified, Some(serde_json::Value::String(s)) if s == "true");

        Ok(ExternalIdentity {
            id: self.sub,
            email,
            name: self.name.filter(|n| !n.trim().is_empty()),
            avatar: self.picture,
            email_verified,
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        let client_id = self.client_id.as_deref().ok_or(IdentityError::NotConfigured)?;

        let response = self
            .client
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", token)])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Rejected(body));
        }

        let info: TokenInfo = response.json().await?;
        info.into_identity(client_id)
    }
}
