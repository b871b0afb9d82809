use actix_web::http::header::AUTHORIZATION;
use actix_web::HttpRequest;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use crate::core::authz::Principal;
use crate::error::FinderError;
use crate::routes::AppState;

/// Claims carried by access tokens from the hosted auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: usize,
}

/// HS256 verification of bearer tokens
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl TokenVerifier {
    /// An empty secret disables authentication; every token is then rejected
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        let key = (!secret.is_empty()).then(|| DecodingKey::from_secret(secret.as_bytes()));
        if key.is_none() {
            tracing::warn!("No JWT secret configured, signed-in operations are disabled");
        }

        Self { key, validation }
    }

    /// Claims of a token that passes signature, audience and expiry checks
    pub fn verify(&self, token: &str) -> Result<Claims, FinderError> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| FinderError::InvalidToken("authentication is not configured".to_string()))?;

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| FinderError::InvalidToken(e.to_string()))
    }
}

/// Bearer token of a request, if one was sent
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, FinderError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = header
        .to_str()
        .map_err(|_| FinderError::InvalidToken("malformed authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or_else(|| FinderError::InvalidToken("expected a bearer token".to_string()))
}

impl AppState {
    /// The caller behind a request; `None` for anonymous requests
    ///
    /// A token that is present but invalid is an error, not an anonymous call.
    pub async fn principal(&self, req: &HttpRequest) -> Result<Option<Principal>, FinderError> {
        let Some(token) = bearer_token(req)? else {
            return Ok(None);
        };

        let claims = self.auth.verify(token)?;
        let principal = self.finder.principal_for(&claims.sub).await?;

        tracing::debug!("Request from {} ({})", principal.user_id, principal.role);
        Ok(Some(principal))
    }
}
