//! HS256 JWT identity verifier.
//!
//! Access tokens are issued by the classroom backend; the chat server only
//! checks them. The user id travels in the `user_id` claim, and the display
//! name is looked up in the user directory so that deleted users are
//! rejected even while their token is still valid.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::domain::{Identity, IdentityVerifier, UserDirectory, UserId, VerifyError};

/// `user_id` may be serialized as a number or as a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawUserId {
    Number(i64),
    Text(String),
}

/// Claims the chat server cares about
#[derive(Debug, Deserialize)]
struct Claims {
    user_id: RawUserId,
    /// `access` or `refresh`; absent on tokens from other issuers
    #[serde(default)]
    token_type: Option<String>,
}

impl Claims {
    fn user_id(&self) -> Result<UserId, VerifyError> {
        match &self.user_id {
            RawUserId::Number(id) => UserId::new(*id),
            RawUserId::Text(text) => text.parse(),
        }
        .map_err(|e| VerifyError::InvalidCredential(e.to_string()))
    }
}

/// Verifies HS256-signed access tokens
pub struct JwtIdentityVerifier {
    key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserDirectory>,
}

impl JwtIdentityVerifier {
    /// Create a verifier for tokens signed with `secret`
    pub fn new(secret: &str, users: Arc<dyn UserDirectory>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            users,
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        if token.is_empty() {
            return Err(VerifyError::MissingCredential);
        }

        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| VerifyError::InvalidCredential(e.to_string()))?
            .claims;

        if let Some(kind) = claims.token_type.as_deref()
            && kind != "access"
        {
            return Err(VerifyError::InvalidCredential(format!(
                "unexpected token type: {}",
                kind
            )));
        }

        let user_id = claims.user_id()?;
        match self.users.find(user_id).await {
            Ok(Some(identity)) => Ok(identity),
            Ok(None) => Err(VerifyError::UnknownUser(user_id.value())),
            Err(e) => Err(VerifyError::LookupFailed(e.to_string())),
        }
    }
}
